//! Column layout for method name listings

/// Arrange `strings` top-to-bottom in as many columns as fit in `width`.
///
/// Every row is indented by two spaces and cells are separated by two
/// spaces. The result ends with a newline unless `strings` is empty.
pub fn columnize(strings: &[String], width: usize) -> String {
    if strings.is_empty() {
        return String::new();
    }

    let mut num_columns = 1;
    let mut layout = layout_in_columns(strings, num_columns);
    while layout[0].len() > 1 {
        let next = layout_in_columns(strings, num_columns + 1);
        if layout_width(&next) > width {
            break;
        }
        layout = next;
        num_columns += 1;
    }

    let widths = column_widths(&layout);
    let height = layout[0].len();
    let mut output = String::new();
    for row in 0..height {
        let mut line = String::from("  ");
        let cells = layout
            .iter()
            .zip(&widths)
            .filter_map(|(column, width)| column.get(row).map(|cell| (cell, *width)));
        for (i, (cell, width)) in cells.enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(&format!("{:<width$}", cell, width = width));
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

fn layout_in_columns(strings: &[String], num_columns: usize) -> Vec<&[String]> {
    let per_column = strings.len().div_ceil(num_columns);
    (0..num_columns)
        .map(|i| {
            let start = (i * per_column).min(strings.len());
            let end = ((i + 1) * per_column).min(strings.len());
            &strings[start..end]
        })
        .collect()
}

fn column_widths(layout: &[&[String]]) -> Vec<usize> {
    layout
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn layout_width(layout: &[&[String]]) -> usize {
    column_widths(layout).iter().sum::<usize>() + 2 * layout.len()
}
