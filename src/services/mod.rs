pub mod horoscope;
pub mod interpretation;
