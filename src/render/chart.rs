use crate::config::Currency;
use crate::currency::format_whole;
use crate::error::AppError;
use crate::models::CostLineItem;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rust_decimal::prelude::ToPrimitive;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

const TEXT_COLOR: RGBColor = RGBColor(0x1f, 0x29, 0x37);
const PALETTE: [RGBColor; 5] = [
    RGBColor(0x06, 0x5f, 0x46),
    RGBColor(0x34, 0xd3, 0x99),
    RGBColor(0x10, 0xb9, 0x81),
    RGBColor(0x05, 0x96, 0x69),
    RGBColor(0x6e, 0xe7, 0xb7),
];

fn draw_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Render(format!("chart: {e}"))
}

/// SVG bar chart of secondary-currency cost per service, drawn on a transparent
/// background. Returns `None` for an empty breakdown.
pub fn render_bar_chart(
    items: &[CostLineItem],
    currency: &Currency,
) -> Result<Option<Vec<u8>>, AppError> {
    if items.is_empty() {
        return Ok(None);
    }

    let values: Vec<f64> = items
        .iter()
        .map(|i| i.amount_secondary.to_f64().unwrap_or(0.0))
        .collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max).max(1.0);
    let n = items.len();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();

        let mut chart = ChartBuilder::on(&root)
            .caption("Cost Breakdown", ("sans-serif", 24).into_font().color(&TEXT_COLOR))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), 0.0..max * 1.15)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc(format!("Cost ({})", currency.code))
            .x_labels(n)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => items
                    .get(*idx)
                    .map(|i| i.service.clone())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .axis_style(TEXT_COLOR.stroke_width(1))
            .label_style(("sans-serif", 13).into_font().color(&TEXT_COLOR))
            .axis_desc_style(("sans-serif", 15).into_font().color(&TEXT_COLOR))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(values.iter().enumerate().map(|(idx, value)| {
                let color = PALETTE[idx % PALETTE.len()];
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(idx), 0.0), (SegmentValue::Exact(idx + 1), *value)],
                    color.filled(),
                );
                bar.set_margin(0, 0, 12, 12);
                bar
            }))
            .map_err(draw_err)?;

        let label_style = ("sans-serif", 14)
            .into_font()
            .style(FontStyle::Bold)
            .color(&TEXT_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(items.iter().zip(values.iter()).enumerate().map(|(idx, (item, value))| {
                Text::new(
                    format_whole(item.amount_secondary, &currency.ascii_symbol),
                    (SegmentValue::CenterOf(idx), *value),
                    label_style.clone(),
                )
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(Some(svg.into_bytes()))
}

pub fn chart_data_uri(svg: &[u8]) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
