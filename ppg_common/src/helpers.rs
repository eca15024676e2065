/// Interprets an environment-style flag. Accepts the usual spellings in either case, with
/// surrounding whitespace ignored; anything unrecognized (or absent) yields the default.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
