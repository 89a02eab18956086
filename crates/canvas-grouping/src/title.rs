//! Display titles derived from chart fields

use canvas_layout::{CanvasElement, ChartFields};

/// Join names as "a", "a and b", "a, b and c"
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Human-readable title for a chart over `fields`
///
/// ```
/// use canvas_grouping::chart_title;
/// use canvas_layout::ChartFields;
///
/// let fields = ChartFields::new(["Region", "Year"], ["Revenue", "Cost"]);
/// assert_eq!(chart_title(&fields), "Revenue and Cost by Region and Year");
/// ```
#[must_use]
pub fn chart_title(fields: &ChartFields) -> String {
    let measures = join_names(&fields.measures);
    let dimensions = join_names(&fields.dimensions);
    match (measures.is_empty(), dimensions.is_empty()) {
        (true, true) => "Empty Chart".to_string(),
        (false, true) => format!("Total {measures}"),
        (true, false) => format!("Distribution by {dimensions}"),
        (false, false) => format!("{measures} by {dimensions}"),
    }
}

/// Explicit title, else one derived from fields
#[must_use]
pub fn display_title(element: &CanvasElement) -> Option<String> {
    element
        .title
        .clone()
        .or_else(|| element.fields.as_ref().map(chart_title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_follow_field_shape() {
        let cases = [
            (ChartFields::new(["Region"], ["Revenue"]), "Revenue by Region"),
            (
                ChartFields::new(["Region", "Year"], ["Revenue", "Cost"]),
                "Revenue and Cost by Region and Year",
            ),
            (
                ChartFields::new(["A", "B", "C"], ["Revenue"]),
                "Revenue by A, B and C",
            ),
            (
                ChartFields::new(Vec::<String>::new(), ["Revenue"]),
                "Total Revenue",
            ),
            (
                ChartFields::new(["Region"], Vec::<String>::new()),
                "Distribution by Region",
            ),
            (
                ChartFields::new(Vec::<String>::new(), Vec::<String>::new()),
                "Empty Chart",
            ),
        ];
        for (fields, expected) in cases {
            assert_eq!(chart_title(&fields), expected);
        }
    }
}
