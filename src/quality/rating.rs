/// Converts a 0-100 quality score into a headline rating band.
///
/// | Range    | Rating    |
/// |----------|-----------|
/// | >= 90    | Excellent |
/// | >= 75    | Good      |
/// | >= 60    | Fair      |
/// | < 60     | Poor      |
pub fn rating(score: f64) -> String {
    match score {
        s if s >= 90.0 => "Excellent".into(),
        s if s >= 75.0 => "Good".into(),
        s if s >= 60.0 => "Fair".into(),
        _ => "Poor".into(),
    }
}
