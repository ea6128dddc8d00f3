//! Example: Stream a multi-sheet xlsx file

use sheetstream::prelude::*;

fn main() -> XlsxResult<()> {
    let mut builder = StreamBuilder::create("/tmp/stream.xlsx")?;

    builder.add_sheet_with_auto_filter(
        "Orders",
        &[
            Some(CellType::Integer),
            None,
            Some(CellType::Decimal),
            Some(CellType::Date),
        ],
    )?;
    builder.add_sheet_with_metadata(
        "Summary",
        vec![
            None,
            Some(ColumnMetadata::new(
                CellType::Numeric,
                NumberFormat::from_string("0.0%"),
            )),
        ],
    )?;

    let mut writer = builder.build()?;

    // Header row falls back to text in the typed columns
    writer.write(&["Order", "Item", "Price", "Shipped"])?;
    for i in 1..=1000 {
        let order = i.to_string();
        let price = format!("{}.5", i % 40);
        let day = format!("2024-03-{:02}", i % 28 + 1);
        writer.write(&[order.as_str(), "Taco", &price, &day])?;
    }

    writer.next_sheet()?;
    writer.write(&["Region", "Share"])?;
    writer.write(&["North", "0.425"])?;
    writer.write(&["South", "0.575"])?;
    writer.add_merge_cells(4, 0, 4, 1)?;

    writer.close()?;
    println!("Created /tmp/stream.xlsx");

    // Read it back
    let workbook = XlsxReader::read_file("/tmp/stream.xlsx")?;
    for sheet in &workbook.sheets {
        println!("{}: {} rows", sheet.name, sheet.rows.len());
    }

    Ok(())
}
