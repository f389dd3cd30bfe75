use crate::config::CurrencySettings;
use crate::error::AppError;
use crate::models::CostLineItem;
use crate::render::column_headers;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

const SHEET_NAME: &str = "Cost Report";

pub fn render_spreadsheet(
    items: &[CostLineItem],
    currency: &CurrencySettings,
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_align(FormatAlign::Center);
    let money = Format::new().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(0, 45)?;
    sheet.set_column_width(1, 16)?;
    sheet.set_column_width(2, 16)?;

    for (col, title) in column_headers(currency).iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &header)?;
    }

    for (idx, item) in items.iter().enumerate() {
        let row = idx as u32 + 1;
        let primary = item.amount_primary.to_f64().ok_or_else(|| {
            AppError::Export(format!("amount for '{}' is out of range", item.service))
        })?;
        let secondary = item.amount_secondary.to_f64().ok_or_else(|| {
            AppError::Export(format!("amount for '{}' is out of range", item.service))
        })?;
        sheet.write_string(row, 0, &item.service)?;
        sheet.write_number_with_format(row, 1, primary, &money)?;
        sheet.write_number_with_format(row, 2, secondary, &money)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::{Cursor, Read};

    fn items() -> Vec<CostLineItem> {
        vec![
            CostLineItem {
                service: "Amazon EC2".into(),
                amount_primary: dec!(12.50),
                amount_secondary: dec!(1037.50),
            },
            CostLineItem {
                service: "AWS Lambda".into(),
                amount_primary: dec!(0.25),
                amount_secondary: dec!(20.75),
            },
        ]
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open xlsx");
        let mut part = archive.by_name(name).expect("xlsx part");
        let mut xml = String::new();
        part.read_to_string(&mut xml).expect("read part");
        xml
    }

    /// The `<c>` element for one cell reference, e.g. `B2`.
    fn cell<'a>(sheet: &'a str, reference: &str) -> &'a str {
        let start = sheet
            .find(&format!("r=\"{reference}\""))
            .unwrap_or_else(|| panic!("cell {reference} missing"));
        let end = sheet[start..].find("</c>").expect("cell end") + start;
        &sheet[start..end]
    }

    #[test]
    fn spreadsheet_is_a_zip_container() {
        let bytes = render_spreadsheet(&items(), &CurrencySettings::default()).expect("xlsx");
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn spreadsheet_has_headers_then_one_row_per_service() {
        let bytes = render_spreadsheet(&items(), &CurrencySettings::default()).expect("xlsx");
        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

        let order: Vec<usize> = ["Service", "Cost (USD)", "Cost (INR)", "Amazon EC2", "AWS Lambda"]
            .iter()
            .map(|s| {
                strings
                    .find(&format!("<t>{s}</t>"))
                    .unwrap_or_else(|| panic!("missing shared string {s}"))
            })
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "strings out of order: {order:?}");

        for (reference, index) in [("A1", 0), ("B1", 1), ("C1", 2), ("A2", 3), ("A3", 4)] {
            assert!(
                cell(&sheet, reference).contains(&format!("<v>{index}</v>")),
                "cell {reference}"
            );
        }
        assert!(cell(&sheet, "B2").contains("<v>12.5</v>"));
        assert!(cell(&sheet, "C2").contains("<v>1037.5</v>"));
        assert!(cell(&sheet, "B3").contains("<v>0.25</v>"));
        assert!(cell(&sheet, "C3").contains("<v>20.75</v>"));
        assert!(!sheet.contains("r=\"A4\""));
    }

    #[test]
    fn repeated_exports_have_identical_content() {
        let currency = CurrencySettings::default();
        let first = render_spreadsheet(&items(), &currency).expect("xlsx");
        let second = render_spreadsheet(&items(), &currency).expect("xlsx");
        for part in ["xl/sharedStrings.xml", "xl/worksheets/sheet1.xml"] {
            assert_eq!(read_part(&first, part), read_part(&second, part), "{part}");
        }
    }
}
