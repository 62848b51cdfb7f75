//! OCR Orchestrator
//!
//! Turns an ordered sequence of page images into an ordered sequence of
//! per-page results, reporting live progress to a consumer callback.
//!
//! One engine instance is created per run and amortized across all pages;
//! pages are processed strictly in index order because the engine is
//! single-flight. Every engine event and every page completion delivers a
//! fresh snapshot of the full result sequence, so consumers relying on
//! value change detection observe every update.

use super::engine::{EngineFactory, ProgressSink, RecognitionEngine};
use super::types::{OcrError, PageImage, PageResult, ProgressEvent};

/// Consumer callback receiving full-sequence snapshots.
pub type UpdateFn<'a> = &'a mut (dyn FnMut(Vec<PageResult>) + Send);

/// Run recognition over `images` with one engine configured for `languages`.
///
/// Delivers an all-placeholder snapshot before any recognition begins, then
/// one snapshot per engine event and one per page completion. Page
/// completion forces that page's progress to 1.0. The engine is released
/// unconditionally, even when a page fails; the recognition error takes
/// precedence over a release error.
///
/// An empty `languages` set is a configuration error and fails before the
/// engine is created or any snapshot is delivered. An empty `images`
/// sequence yields an empty final result with no engine involvement.
pub async fn run(
    factory: &dyn EngineFactory,
    images: &[PageImage],
    languages: &[String],
    on_update: UpdateFn<'_>,
) -> Result<Vec<PageResult>, OcrError> {
    if languages.is_empty() {
        return Err(OcrError::NoLanguages);
    }
    if images.is_empty() {
        return Ok(Vec::new());
    }

    let mut pages: Vec<PageResult> = (0..images.len()).map(PageResult::pending).collect();
    on_update(pages.clone());

    let mut engine = factory.create(languages).await?;

    let outcome = recognize_all(engine.as_mut(), images, &mut pages, on_update).await;
    let released = engine.release().await;

    outcome?;
    released?;
    Ok(pages)
}

async fn recognize_all(
    engine: &mut dyn RecognitionEngine,
    images: &[PageImage],
    pages: &mut Vec<PageResult>,
    on_update: UpdateFn<'_>,
) -> Result<(), OcrError> {
    for (index, image) in images.iter().enumerate() {
        tracing::debug!(page = index, name = %image.name, "Recognizing page");

        let text = {
            // The sink captures only this page's index, so events can never
            // be attributed to another page.
            let mut sink = PageSink {
                index,
                pages: &mut *pages,
                on_update: &mut *on_update,
            };
            engine.recognize(image, &mut sink).await?
        };

        let page = &mut pages[index];
        page.text = Some(text);
        page.progress = 1.0;
        on_update(pages.clone());
    }
    Ok(())
}

/// Progress sink scoped to a single page of one run.
struct PageSink<'a, 'b> {
    index: usize,
    pages: &'a mut Vec<PageResult>,
    on_update: &'a mut (dyn FnMut(Vec<PageResult>) + Send + 'b),
}

impl ProgressSink for PageSink<'_, '_> {
    fn on_event(&mut self, event: ProgressEvent) {
        let page = &mut self.pages[self.index];
        page.status = Some(event.stage);
        page.progress = event.progress.clamp(0.0, 1.0);
        (self.on_update)(self.pages.clone());
    }
}
