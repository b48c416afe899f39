// Settings service - Load/edit/save cycle for one settings record (thresholds or phone number)
use crate::application::telemetry_source::{SettingsEndpoint, SourceError};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What the editor dialog shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState<T> {
    /// Last value loaded from or accepted by the backend
    pub saved: T,
    /// Value being edited in the dialog
    pub draft: T,
    pub open: bool,
    pub last_error: Option<String>,
}

impl<T: Clone + Default> Default for EditorState<T> {
    fn default() -> Self {
        Self {
            saved: T::default(),
            draft: T::default(),
            open: false,
            last_error: None,
        }
    }
}

#[derive(Clone)]
pub struct SettingsEditor<T> {
    name: &'static str,
    endpoint: Arc<dyn SettingsEndpoint<T>>,
    state: Arc<Mutex<EditorState<T>>>,
}

impl<T> SettingsEditor<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    pub fn new(name: &'static str, endpoint: Arc<dyn SettingsEndpoint<T>>) -> Self {
        Self {
            name,
            endpoint,
            state: Arc::new(Mutex::new(EditorState::default())),
        }
    }

    pub async fn view(&self) -> EditorState<T> {
        self.state.lock().await.clone()
    }

    /// Pull the current value. A failure just means "not configured yet": the
    /// record stays blank.
    pub async fn load(&self) {
        match self.endpoint.load().await {
            Ok(value) => {
                let mut state = self.state.lock().await;
                state.saved = value.clone();
                state.draft = value;
                tracing::info!("Loaded {} settings", self.name);
            }
            Err(e) => {
                tracing::warn!("Could not load {} settings, leaving blank: {}", self.name, e);
            }
        }
    }

    pub async fn open(&self) -> EditorState<T> {
        let mut state = self.state.lock().await;
        state.draft = state.saved.clone();
        state.open = true;
        state.last_error = None;
        state.clone()
    }

    pub async fn cancel(&self) -> EditorState<T> {
        let mut state = self.state.lock().await;
        state.open = false;
        state.clone()
    }

    pub async fn edit(&self, draft: T) -> EditorState<T> {
        let mut state = self.state.lock().await;
        state.draft = draft;
        state.clone()
    }

    /// Push the draft. Only a successful save commits it and closes the dialog;
    /// on failure the dialog stays open with `saved` untouched.
    pub async fn save(&self) -> Result<EditorState<T>, (SourceError, EditorState<T>)> {
        let draft = self.state.lock().await.draft.clone();

        match self.endpoint.save(&draft).await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.saved = draft;
                state.open = false;
                state.last_error = None;
                tracing::info!("Saved {} settings", self.name);
                Ok(state.clone())
            }
            Err(e) => {
                tracing::error!("Error saving {} settings: {}", self.name, e);
                let mut state = self.state.lock().await;
                state.last_error = Some(e.to_string());
                Err((e, state.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::{NotificationConfig, ThresholdConfig, ThresholdValue};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeEndpoint<T> {
        stored: Mutex<Option<T>>,
        fail_saves: AtomicBool,
    }

    impl<T> FakeEndpoint<T> {
        fn new(stored: Option<T>) -> Self {
            Self {
                stored: Mutex::new(stored),
                fail_saves: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync + 'static> SettingsEndpoint<T> for FakeEndpoint<T> {
        async fn load(&self) -> Result<T, SourceError> {
            self.stored.lock().await.clone().ok_or(SourceError::Status {
                url: "http://backend/settings".to_string(),
                status: 404,
                body: "not found".to_string(),
            })
        }

        async fn save(&self, value: &T) -> Result<(), SourceError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(SourceError::Status {
                    url: "http://backend/settings/create".to_string(),
                    status: 500,
                    body: "{\"message\":\"db down\"}".to_string(),
                });
            }
            *self.stored.lock().await = Some(value.clone());
            Ok(())
        }
    }

    fn thresholds(temperature: f64, humidity: f64) -> ThresholdConfig {
        ThresholdConfig::new(
            ThresholdValue::Number(temperature),
            ThresholdValue::Number(humidity),
        )
    }

    #[tokio::test]
    async fn test_load_failure_leaves_blank() {
        let endpoint = Arc::new(FakeEndpoint::<NotificationConfig>::new(None));
        let editor = SettingsEditor::<NotificationConfig>::new("phone", endpoint);

        editor.load().await;

        let view = editor.view().await;
        assert_eq!(view.saved.phone_number, "");
        assert!(!view.open);
        assert!(view.last_error.is_none());
    }

    #[tokio::test]
    async fn test_successful_save_commits_and_closes() {
        let endpoint = Arc::new(FakeEndpoint::new(Some(thresholds(30.0, 70.0))));
        let editor = SettingsEditor::<ThresholdConfig>::new("threshold", endpoint.clone());
        editor.load().await;

        editor.open().await;
        editor.edit(thresholds(28.0, 65.0)).await;
        let view = editor.save().await.unwrap();

        assert!(!view.open);
        assert_eq!(view.saved, thresholds(28.0, 65.0));
        assert_eq!(*endpoint.stored.lock().await, Some(thresholds(28.0, 65.0)));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dialog_open_and_values() {
        let endpoint = Arc::new(FakeEndpoint::new(Some(thresholds(30.0, 70.0))));
        endpoint.fail_saves.store(true, Ordering::SeqCst);
        let editor = SettingsEditor::<ThresholdConfig>::new("threshold", endpoint);
        editor.load().await;

        editor.open().await;
        editor.edit(thresholds(10.0, 10.0)).await;
        let (error, view) = editor.save().await.unwrap_err();

        assert!(matches!(error, SourceError::Status { status: 500, .. }));
        assert!(view.open);
        assert_eq!(view.saved, thresholds(30.0, 70.0));
        assert_eq!(view.draft, thresholds(10.0, 10.0));
        assert!(view.last_error.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_open_restores_saved_value_after_cancel() {
        let endpoint = Arc::new(FakeEndpoint::new(Some(NotificationConfig::new("+4712345678"))));
        let editor = SettingsEditor::<NotificationConfig>::new("phone", endpoint);
        editor.load().await;

        editor.open().await;
        editor.edit(NotificationConfig::new("typo")).await;
        let closed = editor.cancel().await;
        assert!(!closed.open);

        let reopened = editor.open().await;
        assert_eq!(reopened.draft.phone_number, "+4712345678");
    }
}
