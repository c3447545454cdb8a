//! Batch slip (docket/autographic record) layout: centered plant header,
//! bordered detail columns, the 20-row material table and its two total rows.

use printpdf::PdfDocument;

use crate::batch_slip::models::{BatchSlipRecord, MaterialRow, MaterialTotals};

use super::canvas::{PageCanvas, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::RenderError;

const TABLE_COLUMNS: [f32; 10] = [26.0, 17.0, 17.0, 17.0, 12.0, 17.0, 17.0, 17.0, 17.0, 17.0];
const TABLE_LEFT: f32 = 18.0;
const ROW_HEIGHT: f32 = 6.0;

fn table_row(canvas: &PageCanvas, y: f32, cells: &[String], bold: bool) {
    let mut x = TABLE_LEFT;
    for (cell, width) in cells.iter().zip(TABLE_COLUMNS.iter()) {
        canvas.rect(x, y, *width, ROW_HEIGHT);
        if bold {
            canvas.text_bold(cell, 7.0, x + 1.0, y + 4.0);
        } else {
            canvas.text(cell, 7.0, x + 1.5, y + 4.0);
        }
        x += width;
    }
}

fn material_cells(label: &str, row: &MaterialRow) -> Vec<String> {
    vec![
        label.to_string(),
        format!("{:.2}", row.sand),
        format!("{:.2}", row.mm40),
        format!("{:.2}", row.mm20),
        format!("{:.2}", row.mm0),
        format!("{:.2}", row.cem1),
        format!("{:.2}", row.cem2),
        format!("{:.2}", row.cem3),
        format!("{:.2}", row.water),
        format!("{:.2}", row.admix1),
    ]
}

fn totals_cells(label: &str, totals: &MaterialTotals) -> Vec<String> {
    vec![
        label.to_string(),
        format!("{:.2}", totals.total_sand),
        format!("{:.2}", totals.total_mm40),
        format!("{:.2}", totals.total_mm20),
        format!("{:.2}", totals.total_mm0),
        format!("{:.2}", totals.total_cem1),
        format!("{:.2}", totals.total_cem2),
        format!("{:.2}", totals.total_cem3),
        format!("{:.2}", totals.total_water),
        format!("{:.2}", totals.total_admix1),
    ]
}

pub fn render_batch_slip_pdf(slip: &BatchSlipRecord) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Batch Slip {}", slip.batch_number),
        printpdf::Mm(PAGE_WIDTH_MM),
        printpdf::Mm(PAGE_HEIGHT_MM),
        "batch-slip",
    );
    let canvas = PageCanvas::new(&doc, doc.get_page(page).get_layer(layer))?;

    // Plant header
    canvas.text_centered("RR CONSTRUCTIONS", 14.0, 18.0, true);
    canvas.text_centered("MCI 70 Control System Ver 3.1", 9.0, 24.0, false);
    canvas.text_centered("SCHWING Stetter", 9.0, 29.0, false);

    // Title band
    canvas.rect(18.0, 36.0, 122.0, 8.0);
    canvas.rect(140.0, 36.0, 52.0, 8.0);
    canvas.text_bold("Docket / Batch Report / Autographic Record", 9.0, 22.0, 41.5);
    canvas.text_bold(
        &format!("Plant Serial: {}", slip.plant_serial_number),
        8.0,
        142.0,
        41.5,
    );

    // Detail columns
    let details_top = 48.0;
    let left_details: [(&str, String); 12] = [
        ("Batch Date", slip.batch_date.format("%Y-%m-%d").to_string()),
        ("Batch Start Time", slip.batch_start_time.clone()),
        ("Batch End Time", slip.batch_end_time.clone()),
        ("Batch Number / Docket Number", slip.batch_number.clone()),
        ("Customer", slip.customer.clone()),
        ("Site", slip.site.clone()),
        ("Recipe Code", slip.recipe_code.clone()),
        ("Recipe Name", slip.recipe_name.clone()),
        ("Truck Number", slip.truck_number.clone()),
        ("Truck Driver", slip.truck_driver.clone()),
        ("Order Number", slip.order_number.clone()),
        ("Batcher Name", slip.batcher_name.clone()),
    ];
    for (i, (label, value)) in left_details.iter().enumerate() {
        let y = details_top + i as f32 * ROW_HEIGHT;
        canvas.rect(18.0, y, 62.0, ROW_HEIGHT);
        canvas.rect(80.0, y, 60.0, ROW_HEIGHT);
        canvas.text(&format!("{} :", label), 8.0, 20.0, y + 4.0);
        canvas.text(value, 8.0, 82.0, y + 4.0);
    }

    let right_details: [(&str, f64); 6] = [
        ("Ordered Quantity", slip.ordered_quantity),
        ("Production Quantity", slip.production_quantity),
        ("Adj/Manual Quantity", slip.adj_manual_quantity),
        ("With This Load", slip.with_this_load),
        ("Mixer Capacity", slip.mixer_capacity),
        ("Batch Size", slip.batch_size),
    ];
    for (i, (label, value)) in right_details.iter().enumerate() {
        let y = details_top + i as f32 * ROW_HEIGHT;
        canvas.rect(142.0, y, 34.0, ROW_HEIGHT);
        canvas.rect(176.0, y, 16.0, ROW_HEIGHT);
        canvas.text(&format!("{} :", label), 8.0, 143.5, y + 4.0);
        canvas.text(&format!("{:.2} M3", value), 8.0, 177.0, y + 4.0);
    }

    // Material table: header, 20 dosage rows, set and actual total rows.
    let mut y = 126.0;
    let headers = [
        "Batch Size in M3",
        "SAND",
        "40 MM",
        "20 MM",
        "0",
        "CEM-1",
        "CEM-2",
        "CEM-3",
        "WATER",
        "ADMIX1",
    ];
    table_row(
        &canvas,
        y,
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        true,
    );

    for (i, row) in slip.material_data.iter().enumerate() {
        y += ROW_HEIGHT;
        table_row(&canvas, y, &material_cells(&format!("{}", i + 1), row), false);
    }

    y += ROW_HEIGHT;
    table_row(&canvas, y, &totals_cells("Total Set Weight", &slip.totals), true);
    y += ROW_HEIGHT;
    table_row(&canvas, y, &totals_cells("Total Actual", &slip.totals), true);

    // Footer
    canvas.text("Batcher Name :", 9.0, 18.0, y + 14.0);
    canvas.text(&slip.batcher_name, 9.0, 18.0, y + 19.0);

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
