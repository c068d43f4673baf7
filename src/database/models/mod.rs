pub mod horoscope;
pub mod natal_chart;
pub mod subscription;
pub mod user;
