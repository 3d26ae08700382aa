// "Years active" labels for search results and player detail.

/// Label for the span of seasons a player appears in.
///
/// `"2019-2021"` for a finished span, `"2022"` for a single past season,
/// `"2019-Present"` when the latest season is `current_year` and
/// `"Unknown"` when there are no seasons. Order of the input does not
/// matter.
pub fn years_active(seasons: impl IntoIterator<Item = u16>, current_year: u16) -> String {
    let mut span: Option<(u16, u16)> = None;
    for year in seasons {
        span = Some(match span {
            None => (year, year),
            Some((first, last)) => (first.min(year), last.max(year)),
        });
    }

    match span {
        None => "Unknown".to_string(),
        Some((first, last)) if last == current_year => format!("{first}-Present"),
        Some((first, last)) if first == last => first.to_string(),
        Some((first, last)) => format!("{first}-{last}"),
    }
}
