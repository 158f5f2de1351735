use wasm_bindgen::prelude::wasm_bindgen;

/// Converts a number in BGR byte order (the host's packed color format) to
/// a CSS `rgb()` string. Returns `None` when the input isn't a finite
/// number.
#[wasm_bindgen(js_name = numToRGB)]
pub fn num_to_rgb(num: f64) -> Option<String> {
    if !num.is_finite() {
        return None;
    }

    let v = num.trunc() as i64 as u32;
    let r = v & 0xff;
    let g = (v >> 8) & 0xff;
    let b = (v >> 16) & 0xff;

    Some(format!("rgb({r},{g},{b})"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_low_byte_is_red() {
        assert_eq!(num_to_rgb(0xff_f0_0a as f64).unwrap(), "rgb(10,240,255)");
        assert_eq!(num_to_rgb(0.0).unwrap(), "rgb(0,0,0)");
        assert_eq!(num_to_rgb(255.0).unwrap(), "rgb(255,0,0)");
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        assert_eq!(num_to_rgb(f64::NAN), None);
        assert_eq!(num_to_rgb(f64::INFINITY), None);
    }
}
