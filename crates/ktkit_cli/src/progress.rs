//! Text progress gauge for `kt check`.

use std::io::Write;

use ktkit_io_fs::SpecDigestProgress;

/// Bar width in characters.
pub const N_WIDTH_GAUGE_DEFAULT: usize = 30;

/// `calculating: read/total [####      ] NN%`.
pub fn format_gauge(progress: &SpecDigestProgress, n_width: usize) -> String {
    let n_percent = derive_percent(progress);
    let n_filled = n_width * n_percent as usize / 100;
    format!(
        "calculating: {}/{} [{}{}] {n_percent}%",
        progress.n_bytes_read,
        progress.n_bytes_total,
        "#".repeat(n_filled),
        " ".repeat(n_width - n_filled),
    )
}

fn derive_percent(progress: &SpecDigestProgress) -> u8 {
    (progress.ratio() * 100.0).floor().clamp(0.0, 100.0) as u8
}

/// Redraws a single gauge line in place whenever the percentage moves.
#[derive(Debug)]
pub struct TextGauge<W: Write> {
    writer: W,
    n_width: usize,
    n_percent_last: Option<u8>,
}

impl TextGauge<std::io::Stderr> {
    /// Gauge drawn on stderr.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr(), N_WIDTH_GAUGE_DEFAULT)
    }
}

impl<W: Write> TextGauge<W> {
    pub fn new(writer: W, n_width: usize) -> Self {
        Self {
            writer,
            n_width,
            n_percent_last: None,
        }
    }

    /// Draw `progress` unless the visible percentage is unchanged.
    pub fn render(&mut self, progress: &SpecDigestProgress) {
        let n_percent = derive_percent(progress);
        if self.n_percent_last == Some(n_percent) {
            return;
        }
        self.n_percent_last = Some(n_percent);
        // Gauge output is best effort.
        let _ = write!(self.writer, "\r{}", format_gauge(progress, self.n_width));
        let _ = self.writer.flush();
    }

    /// Terminate the gauge line if anything was drawn.
    pub fn finish(&mut self) {
        if self.n_percent_last.is_some() {
            let _ = writeln!(self.writer);
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(n_bytes_read: u64, n_bytes_total: u64) -> SpecDigestProgress {
        SpecDigestProgress {
            n_bytes_read,
            n_bytes_total,
        }
    }

    #[test]
    fn gauge_line_shows_bytes_bar_and_percent() {
        assert_eq!(
            format_gauge(&progress(50, 200), 8),
            "calculating: 50/200 [##      ] 25%"
        );
        assert_eq!(
            format_gauge(&progress(200, 200), 4),
            "calculating: 200/200 [####] 100%"
        );
    }

    #[test]
    fn gauge_redraws_only_on_percent_change() {
        let mut gauge = TextGauge::new(Vec::new(), 4);
        gauge.render(&progress(1, 1000));
        gauge.render(&progress(2, 1000));
        gauge.render(&progress(1000, 1000));
        gauge.finish();

        let text = String::from_utf8(gauge.into_inner()).unwrap();
        assert_eq!(text.matches('\r').count(), 2);
        assert!(text.ends_with("100%\n"));
    }

    #[test]
    fn untouched_gauge_prints_nothing() {
        let mut gauge = TextGauge::new(Vec::new(), 4);
        gauge.finish();
        assert!(gauge.into_inner().is_empty());
    }
}
