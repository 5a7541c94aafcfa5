//! Tabular summary of one crop run, printed with `--report`
use prettytable::{format, Cell, Row, Table};

use super::ProcessingResult;

pub fn build_label_table(result: &ProcessingResult) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.add_row(Row::new(vec![
        Cell::new("Label"),
        Cell::new("Confidence"),
        Cell::new("Instances"),
    ]));

    for label in &result.labels {
        table.add_row(Row::new(vec![
            Cell::new(&label.name),
            Cell::new(&format!("{:.1}%", label.confidence)),
            Cell::new(&label.instances.len().to_string()),
        ]));
    }

    table
}

pub fn build_geometry_table(result: &ProcessingResult) -> Table {
    let plan = &result.plan;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    let rows = [
        (
            "Image",
            format!("{}x{}", plan.image_width, plan.image_height),
        ),
        (
            "Envelope",
            format!(
                "({:.4}, {:.4}) - ({:.4}, {:.4})",
                plan.envelope.top_left.0,
                plan.envelope.top_left.1,
                plan.envelope.bottom_right.0,
                plan.envelope.bottom_right.1
            ),
        ),
        (
            "Envelope px",
            format!("{}x{}", plan.envelope_width, plan.envelope_height),
        ),
        ("Ratio", plan.ratio.to_string()),
        (
            "Shift",
            format!("h {:.1} / v {:.1}", plan.shift.horizontal, plan.shift.vertical),
        ),
        ("Crop", plan.rect.to_string()),
    ];

    for (name, value) in rows {
        table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
    }

    table
}

pub fn print_report(result: &ProcessingResult) {
    println!("\n{}\n", "=".repeat(60));
    println!("CROP REPORT: {}\n", result.image);

    if result.labels.is_empty() {
        println!("No labels detected\n");
    } else {
        build_label_table(result).printstd();
        println!();
    }

    build_geometry_table(result).printstd();
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::detection::{Instance, Label};
    use crate::backend::ImageRef;
    use crate::image_processing::envelope::{BoundingBox, Envelope};
    use crate::image_processing::ratio::AspectRatio;
    use crate::image_processing::CropPlan;
    use std::time::Duration;

    fn sample_result() -> ProcessingResult {
        let bbox = BoundingBox::new(0.25, 0.25, 0.25, 0.25);
        let plan =
            CropPlan::new(Envelope::from_box(&bbox), 800, 400, AspectRatio::default()).unwrap();

        ProcessingResult {
            image: ImageRef::new("photos", "dog.jpg"),
            labels: vec![
                Label {
                    name: "Dog".to_string(),
                    confidence: 97.5,
                    instances: vec![Instance {
                        bounding_box: bbox,
                        confidence: 96.0,
                    }],
                },
                Label {
                    name: "Grass".to_string(),
                    confidence: 80.0,
                    instances: Vec::new(),
                },
            ],
            plan,
            output_path: None,
            debug_path: None,
            content_hash: String::new(),
            processing_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_label_table_has_header_and_one_row_per_label() {
        let table = build_label_table(&sample_result());
        assert_eq!(table.len(), 3);
        assert_eq!(table[1][0].get_content(), "Dog");
        assert_eq!(table[1][1].get_content(), "97.5%");
        assert_eq!(table[2][2].get_content(), "0");
    }

    #[test]
    fn test_geometry_table() {
        let table = build_geometry_table(&sample_result());
        assert_eq!(table.len(), 6);
        assert_eq!(table[0][1].get_content(), "800x400");
        assert_eq!(table[2][1].get_content(), "200x100");
        assert_eq!(table[3][1].get_content(), "3:2");
        assert_eq!(table[4][1].get_content(), "h 0.0 / v 16.5");
    }
}
