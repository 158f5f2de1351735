//! Common formatting functions used by the custom widgets.
//!
//! Everything is exported under the JS names widget code already calls
//! (`numToRGB`, `strToDate`, ...) so a widget bundle can swap this in
//! without touching its call sites.

pub mod color;
pub mod datetime;
pub mod font;

pub use color::num_to_rgb;
pub use datetime::{
    is_valid_date, is_valid_date_time, is_valid_time, num_to_key, num_to_time_part, str_to_date,
    str_to_date_time, str_to_time,
};
pub use font::{parse_font_style, FontStyle};
