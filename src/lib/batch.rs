use std::fmt;

use nftr_parser::{
    render_grid, Container, ContainerLayout, GlyphMapping, GlyphPatcher, NftrError, Transcoder,
};
use thiserror::Error;

use super::raster::{GlyphSource, RasterError, RasterizedGlyph};

/// Why one glyph was skipped.
#[derive(Debug, Error)]
pub enum GlyphFailure {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Codec(#[from] NftrError),
}

#[derive(Debug)]
pub struct GlyphOutcome {
    pub index: usize,
    pub character: char,
    /// Ink width of the inserted glyph.
    pub result: Result<usize, GlyphFailure>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<GlyphOutcome>,
    /// Whether the container was written back.
    pub saved: bool,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &GlyphOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted {}/{} glyphs",
            self.succeeded(),
            self.attempted()
        )
    }
}

/// Rasterizes, encodes and patches a mapping table into a container, one glyph at a
/// time.
///
/// A failing glyph is logged and skipped. The container is written once at the end
/// if anything was patched. Storage errors abort the run.
pub struct BatchDriver<S> {
    source: S,
    layout: ContainerLayout,
    transcoder: Transcoder,
    start: Option<usize>,
    end: Option<usize>,
    preview: bool,
}

impl<S: GlyphSource> BatchDriver<S> {
    pub fn new(source: S, layout: ContainerLayout) -> Result<Self, NftrError> {
        Ok(Self {
            source,
            transcoder: Transcoder::new(&layout)?,
            layout,
            start: None,
            end: None,
            preview: false,
        })
    }

    /// Only slots in `start..=end` are processed.
    pub fn with_range(mut self, start: Option<usize>, end: Option<usize>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Print each rasterized cell before it is encoded.
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn run(
        &mut self,
        container: &mut Container,
        mapping: &GlyphMapping,
    ) -> Result<BatchReport, NftrError> {
        let mapping = mapping.filter_range(self.start, self.end);
        let mut patcher = GlyphPatcher::with_backup(self.layout, container.backup_path());
        let mut report = BatchReport::default();

        log::info!(
            "inserting {} glyphs into {}",
            mapping.len(),
            container.path().display()
        );

        for (index, character) in mapping.iter() {
            let result = match self.insert(&mut patcher, container.bytes_mut(), index, character) {
                Ok(glyph) => {
                    log::info!(
                        "✓ '{character}' -> slot {index} (ink width {} px)",
                        glyph.ink_width
                    );
                    Ok(glyph.ink_width)
                }
                Err(GlyphFailure::Codec(e)) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("✗ '{character}' -> slot {index}: {e}");
                    Err(e)
                }
            };

            report.outcomes.push(GlyphOutcome {
                index,
                character,
                result,
            });
        }

        if report.succeeded() > 0 {
            container.save()?;
            report.saved = true;
        } else {
            log::warn!(
                "nothing inserted, {} left untouched",
                container.path().display()
            );
        }

        Ok(report)
    }

    fn insert(
        &mut self,
        patcher: &mut GlyphPatcher,
        buffer: &mut [u8],
        index: usize,
        character: char,
    ) -> Result<RasterizedGlyph, GlyphFailure> {
        let glyph = self.source.rasterize(character)?;

        if self.preview {
            println!("preview of '{character}':");
            print!("{}", render_grid(&glyph.grid));
        }

        let record = self.transcoder.encode(&glyph.grid)?;
        patcher.patch(buffer, index, &record)?;

        Ok(glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eg_nftr::GridCanvas;
    use embedded_graphics::{
        pixelcolor::BinaryColor,
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };
    use std::fs;
    use std::path::PathBuf;

    /// Draws a bar whose height depends on the character; `?` has no font.
    struct Bars;

    impl GlyphSource for Bars {
        fn rasterize(&mut self, character: char) -> Result<RasterizedGlyph, RasterError> {
            if character == '?' {
                return Err(RasterError::FontRead {
                    path: PathBuf::from("missing.ttf"),
                    source: std::io::ErrorKind::NotFound.into(),
                });
            }

            let mut canvas = GridCanvas::new(13, 15);
            Rectangle::new(Point::new(0, 2), Size::new(6, character as u32 % 10 + 3))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(&mut canvas)
                .unwrap();

            Ok(RasterizedGlyph::new(character, canvas.into_grid()))
        }
    }

    struct Fixture {
        path: PathBuf,
        original: Vec<u8>,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let layout = ContainerLayout::default();
            let path = std::env::temp_dir()
                .join(format!("nftr_batch_{}_{name}.nftr", std::process::id()));
            let original: Vec<u8> = (0..layout.width_offset(layout.glyph_count))
                .map(|i| (i * 7 % 256) as u8)
                .collect();
            fs::write(&path, &original).unwrap();
            let _ = fs::remove_file(nftr_parser::backup_path_for(&path));

            Self { path, original }
        }

        fn run(&self, mapping: &GlyphMapping) -> BatchReport {
            let mut container = Container::open(&self.path).unwrap();
            BatchDriver::new(Bars, ContainerLayout::default())
                .unwrap()
                .run(&mut container, mapping)
                .unwrap()
        }

        fn bytes(&self) -> Vec<u8> {
            fs::read(&self.path).unwrap()
        }

        fn backup(&self) -> PathBuf {
            nftr_parser::backup_path_for(&self.path)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
            let _ = fs::remove_file(self.backup());
        }
    }

    #[test]
    fn it_is_stable_across_repeated_runs() {
        let fixture = Fixture::new("repeat");
        let mapping = GlyphMapping::from_entries(vec![(32, 'А'), (33, 'Б'), (65, 'а')]);

        let first = fixture.run(&mapping);
        assert_eq!(3, first.succeeded());
        assert!(first.saved);
        let after_first = fixture.bytes();
        assert_ne!(fixture.original, after_first);

        let second = fixture.run(&mapping);
        assert_eq!(3, second.succeeded());
        assert!(second.saved);
        assert_eq!(after_first, fixture.bytes());

        assert_eq!(fixture.original, fs::read(fixture.backup()).unwrap());
    }

    #[test]
    fn it_keeps_going_past_a_bad_slot() {
        let fixture = Fixture::new("bad_slot");
        let mapping = GlyphMapping::from_entries(vec![(32, 'А'), (9000, 'Б'), (34, 'В')]);

        let report = fixture.run(&mapping);
        assert_eq!(3, report.attempted());
        assert_eq!(2, report.succeeded());
        assert!(report.saved);

        let failed: Vec<_> = report.failures().collect();
        assert_eq!(1, failed.len());
        assert_eq!(9000, failed[0].index);
        assert!(matches!(
            failed[0].result,
            Err(GlyphFailure::Codec(NftrError::GlyphIndex { index: 9000, .. }))
        ));

        let layout = ContainerLayout::default();
        let transcoder = Transcoder::new(&layout).unwrap();
        let expected = transcoder
            .encode(&Bars.rasterize('В').unwrap().grid)
            .unwrap();
        let at = layout.bitmap_offset(34);
        assert_eq!(expected, fixture.bytes()[at..at + 25]);
    }

    #[test]
    fn it_keeps_going_past_a_missing_font() {
        let fixture = Fixture::new("no_font");
        let mapping = GlyphMapping::from_entries(vec![(40, '?'), (41, 'И')]);

        let report = fixture.run(&mapping);
        assert_eq!(1, report.succeeded());
        assert!(matches!(
            report.outcomes[0].result,
            Err(GlyphFailure::Raster(_))
        ));
        assert!(report.saved);
    }

    #[test]
    fn it_leaves_the_file_alone_when_nothing_succeeds() {
        let fixture = Fixture::new("nothing");
        let mapping = GlyphMapping::from_entries(vec![(541, 'А'), (50, '?')]);

        let report = fixture.run(&mapping);
        assert_eq!(0, report.succeeded());
        assert!(!report.saved);
        assert_eq!(fixture.original, fixture.bytes());
        assert!(!fixture.backup().exists());
    }

    #[test]
    fn it_applies_the_range_before_iterating() {
        let fixture = Fixture::new("range");
        let mapping = GlyphMapping::from_entries(vec![(32, 'А'), (33, 'Б'), (34, 'В'), (65, 'а')]);

        let mut container = Container::open(&fixture.path).unwrap();
        let report = BatchDriver::new(Bars, ContainerLayout::default())
            .unwrap()
            .with_range(Some(33), Some(34))
            .run(&mut container, &mapping)
            .unwrap();

        let slots: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(vec![33, 34], slots);

        let layout = ContainerLayout::default();
        let untouched = layout.bitmap_offset(32);
        assert_eq!(
            fixture.original[untouched..untouched + 25],
            fixture.bytes()[untouched..untouched + 25]
        );
    }

    #[test]
    fn it_tallies_the_run() {
        let fixture = Fixture::new("tally");
        let mapping = GlyphMapping::from_entries(vec![(32, 'А'), (9000, 'Б')]);
        assert_eq!("inserted 1/2 glyphs", fixture.run(&mapping).to_string());
    }
}
