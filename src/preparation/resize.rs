/// Uniform scale bringing the longest edge down to `max_dimension`. Never above 1.
pub fn downscale_factor(width: u32, height: u32, max_dimension: u32) -> f64 {
    let longest = width.max(height);
    if longest == 0 {
        return 1.0;
    }
    (max_dimension as f64 / longest as f64).min(1.0)
}

/// Target size after downscaling: rounded to the nearest pixel, floored at 1px.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scale = downscale_factor(width, height, max_dimension);
    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}
