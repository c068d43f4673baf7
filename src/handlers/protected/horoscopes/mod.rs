pub mod all_signs;
pub mod daily;
pub mod extended;

pub use all_signs::get as all_signs_get;
pub use daily::get as daily_get;
pub use extended::monthly_get;
pub use extended::weekly_get;
