use plotters::prelude::*;

use crate::error::PipelineError;
use crate::report::CurveTable;

const PLOT_SIZE: (u32, u32) = (640, 480);

/// Draw recall (x) against precision (y) as an SVG document.
pub fn render_curve_svg(table: &CurveTable) -> Result<String, PipelineError> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .build_cartesian_2d(0.0_f64..1.0_f64, 0.0_f64..1.05_f64)
            .map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(
                table.rows().iter().map(|row| (row.recall, row.precision)),
                &BLUE,
            ))
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }

    Ok(svg)
}

fn plot_error<E: std::fmt::Display>(error: E) -> PipelineError {
    PipelineError::Plot(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision_recall::PrecisionRecallCurve;

    #[test]
    fn renders_svg_document() {
        let table = CurveTable::from_curve(&PrecisionRecallCurve {
            precision: vec![0.5, 0.75, 1.0, 1.0],
            recall: vec![1.0, 0.6, 0.2, 0.0],
            thresholds: vec![0.1, 0.5, 0.9],
        })
        .unwrap();

        let svg = render_curve_svg(&table).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("</svg>"));
    }
}
