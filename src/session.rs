use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::{
    config::TRY_ON_PATH,
    error::{Result, TryOnError},
    gemini::TryOnBackend,
    models::{
        BookingAttachment, EncodedImage, ErrorBody, TryOnRequest, TryOnResponse, UploadedImage,
    },
    preparation::ImagePreparer,
};

pub const DEFAULT_PROXY_ERROR: &str = "Failed to generate try-on.";
pub const MISSING_IMAGES_ERROR: &str = "Please upload both images before continuing.";

/// HTTP client for the try-on proxy route.
#[derive(Clone, Debug)]
pub struct ProxyClient {
    http: Client,
    endpoint: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(180))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TryOnError::ConfigError(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TRY_ON_PATH),
        })
    }
}

#[async_trait]
impl TryOnBackend for ProxyClient {
    async fn try_on(&self, request: TryOnRequest) -> Result<EncodedImage> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TryOnError::Timeout(e.to_string())
                } else {
                    TryOnError::RequestError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| DEFAULT_PROXY_ERROR.to_string());
            return Err(TryOnError::ProxyError(message));
        }

        let body: TryOnResponse = response
            .json()
            .await
            .map_err(|e| TryOnError::ResponseError(e.to_string()))?;
        Ok(EncodedImage::from_base64(&body.output_image))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadSlot {
    pub image: Option<EncodedImage>,
    pub error: Option<String>,
}

/// What the page renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub style: UploadSlot,
    pub selfie: UploadSlot,
    pub output: Option<EncodedImage>,
    pub error: Option<String>,
    pub loading: bool,
}

impl SessionView {
    pub fn can_book(&self) -> bool {
        self.output.is_some() && self.selfie.image.is_some()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    view: SessionView,
    ticket: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Style,
    Selfie,
}

/// Client-side try-on flow. A newer submission aborts the in-flight one and
/// stale completions are dropped by ticket.
pub struct TryOnSession<B: TryOnBackend> {
    preparer: ImagePreparer,
    backend: Arc<B>,
    state: Arc<Mutex<SessionState>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl<B: TryOnBackend + 'static> TryOnSession<B> {
    pub fn new(preparer: ImagePreparer, backend: Arc<B>) -> Self {
        Self {
            preparer,
            backend,
            state: Arc::new(Mutex::new(SessionState::default())),
            in_flight: Mutex::new(None),
        }
    }

    pub fn view(&self) -> SessionView {
        self.lock_state().view.clone()
    }

    pub fn upload_style(&self, upload: &UploadedImage) -> Result<()> {
        let outcome = self.preparer.prepare(upload);
        self.apply_upload(Slot::Style, outcome)
    }

    pub fn upload_selfie(&self, upload: &UploadedImage) -> Result<()> {
        let outcome = self.preparer.prepare(upload);
        self.apply_upload(Slot::Selfie, outcome)
    }

    /// Prepares both files concurrently, filling each slot independently.
    pub async fn upload_pair(&self, style: UploadedImage, selfie: UploadedImage) -> Result<()> {
        let (style_outcome, selfie_outcome) = self.preparer.prepare_pair(style, selfie).await;
        let style_result = self.apply_upload(Slot::Style, style_outcome.map(|p| p.image));
        let selfie_result = self.apply_upload(Slot::Selfie, selfie_outcome.map(|p| p.image));
        style_result.and(selfie_result)
    }

    fn apply_upload(&self, slot: Slot, outcome: Result<EncodedImage>) -> Result<()> {
        let mut state = self.lock_state();
        let target = match slot {
            Slot::Style => &mut state.view.style,
            Slot::Selfie => &mut state.view.selfie,
        };
        match outcome {
            Ok(image) => {
                target.image = Some(image);
                target.error = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("Upload for {:?} slot rejected: {}", slot, e);
                target.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Starts a generation for the current pair and returns its ticket.
    pub fn submit(&self) -> Result<u64> {
        self.submit_with_prompt(None)
    }

    pub fn submit_with_prompt(&self, prompt: Option<String>) -> Result<u64> {
        // Held until the new handle is stored so ticket order and handle order agree.
        let mut in_flight = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let (ticket, request) = {
            let mut state = self.lock_state();
            let pair = state
                .view
                .style
                .image
                .clone()
                .zip(state.view.selfie.image.clone());
            let Some((style, selfie)) = pair else {
                state.view.error = Some(MISSING_IMAGES_ERROR.to_string());
                return Err(TryOnError::ValidationError(MISSING_IMAGES_ERROR.into()));
            };
            state.ticket += 1;
            state.view.loading = true;
            state.view.error = None;
            state.view.output = None;

            let mut request = TryOnRequest::new(&style, &selfie);
            request.prompt = prompt;
            (state.ticket, request)
        };

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let outcome = backend.try_on(request).await;
            let mut state = match state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if state.ticket != ticket {
                log::debug!("Dropping stale result for submission {}", ticket);
                return;
            }
            state.view.loading = false;
            match outcome {
                Ok(image) => state.view.output = Some(image),
                Err(e) => {
                    log::warn!("Submission {} failed: {}", ticket, e);
                    state.view.error = Some(e.user_message());
                }
            }
        });

        if let Some(previous) = in_flight.replace(handle) {
            log::debug!("Cancelling superseded submission");
            previous.abort();
        }
        Ok(ticket)
    }

    /// Waits for the latest submission, if any, to finish.
    pub async fn settled(&self) -> SessionView {
        let handle = match self.in_flight.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::error!("Submission task failed: {}", e);
                }
            }
        }
        self.view()
    }

    /// The "Book this look" action: only available once a result is shown.
    pub fn book_this_look(&self) -> Option<BookingAttachment> {
        let state = self.lock_state();
        match (&state.view.selfie.image, &state.view.output) {
            (Some(selfie), Some(output)) => Some(BookingAttachment {
                selfie_image: selfie.clone(),
                output_image: output.clone(),
            }),
            _ => None,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedBackend {
        calls: AtomicUsize,
        script: Vec<(Duration, Result<&'static str>)>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<(Duration, Result<&'static str>)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script,
            })
        }
    }

    #[async_trait]
    impl TryOnBackend for ScriptedBackend {
        async fn try_on(&self, request: TryOnRequest) -> Result<EncodedImage> {
            assert!(request.model_image.is_some() && request.selfie_image.is_some());
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, outcome) = &self.script[index];
            tokio::time::sleep(*delay).await;
            match outcome {
                Ok(data) => Ok(EncodedImage::jpeg(*data)),
                Err(TryOnError::ProxyError(msg)) => Err(TryOnError::ProxyError(msg.clone())),
                Err(_) => Err(TryOnError::EmptyResult),
            }
        }
    }

    fn png(width: u32, height: u32) -> UploadedImage {
        let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 90]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        UploadedImage::new(bytes)
    }

    fn session_with(backend: Arc<ScriptedBackend>) -> TryOnSession<ScriptedBackend> {
        TryOnSession::new(ImagePreparer::default(), backend)
    }

    #[tokio::test]
    async fn submit_without_both_images_never_calls_backend() {
        let backend = ScriptedBackend::new(vec![]);
        let session = session_with(backend.clone());
        session.upload_style(&png(32, 32)).unwrap();

        let err = session.submit().unwrap_err();
        assert!(matches!(err, TryOnError::ValidationError(_)));
        assert_eq!(session.view().error.as_deref(), Some(MISSING_IMAGES_ERROR));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bad_upload_sets_inline_error_only_on_its_slot() {
        let session = session_with(ScriptedBackend::new(vec![]));
        session.upload_style(&png(32, 32)).unwrap();
        assert!(session
            .upload_selfie(&UploadedImage::new(b"nope".to_vec()))
            .is_err());

        let view = session.view();
        assert!(view.style.error.is_none());
        assert_eq!(view.selfie.error.as_deref(), Some("Unable to process image."));
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn successful_submission_enables_booking() {
        let backend = ScriptedBackend::new(vec![(Duration::ZERO, Ok("T1VU"))]);
        let session = session_with(backend);
        session.upload_pair(png(40, 30), png(30, 40)).await.unwrap();
        assert!(session.book_this_look().is_none());

        session.submit().unwrap();
        let view = session.settled().await;
        assert!(!view.loading);
        assert_eq!(view.output, Some(EncodedImage::jpeg("T1VU")));
        assert!(view.can_book());

        let attachment = session.book_this_look().unwrap();
        assert_eq!(attachment.output_image.data, "T1VU");
        assert_eq!(Some(attachment.selfie_image), view.selfie.image);
    }

    #[tokio::test]
    async fn newer_submission_supersedes_older_one() {
        let backend = ScriptedBackend::new(vec![
            (Duration::from_millis(300), Ok("T0xE")),
            (Duration::from_millis(10), Ok("TkVX")),
        ]);
        let session = session_with(backend.clone());
        session.upload_pair(png(20, 20), png(20, 20)).await.unwrap();

        let first = session.submit().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = session.submit().unwrap();
        assert!(second > first);

        let view = session.settled().await;
        assert_eq!(view.output, Some(EncodedImage::jpeg("TkVX")));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(session.view().output, Some(EncodedImage::jpeg("TkVX")));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_settle_on_the_latest() {
        for _ in 0..10 {
            let backend = ScriptedBackend::new(
                (0..8)
                    .map(|_| (Duration::from_millis(5), Ok("TEFTVA==")))
                    .collect(),
            );
            let session = Arc::new(session_with(backend));
            session.upload_pair(png(20, 20), png(20, 20)).await.unwrap();

            let submits: Vec<_> = (0..8)
                .map(|_| {
                    let session = Arc::clone(&session);
                    tokio::spawn(async move { session.submit().unwrap() })
                })
                .collect();
            let mut tickets = Vec::new();
            for submit in submits {
                tickets.push(submit.await.unwrap());
            }

            let view = session.settled().await;
            assert!(!view.loading, "session stuck loading after {tickets:?}");
            assert_eq!(view.output, Some(EncodedImage::jpeg("TEFTVA==")));
            assert!(view.error.is_none());
        }
    }

    #[tokio::test]
    async fn backend_failure_becomes_single_message() {
        let backend = ScriptedBackend::new(vec![(
            Duration::ZERO,
            Err(TryOnError::ProxyError("Gemini request failed".into())),
        )]);
        let session = session_with(backend);
        session.upload_pair(png(20, 20), png(20, 20)).await.unwrap();
        session.submit().unwrap();

        let view = session.settled().await;
        assert_eq!(view.error.as_deref(), Some("Gemini request failed"));
        assert!(view.output.is_none());
        assert!(session.book_this_look().is_none());
    }
}
