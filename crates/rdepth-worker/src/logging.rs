//! Structured scene logging utilities.
//!
//! Gives scene processing consistent log lines and a tracing span carrying
//! the scene identity.

use tracing::{error, info, warn, Span};

/// Scene logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct SceneLogger {
    scene_token: String,
    scene_index: usize,
}

impl SceneLogger {
    /// Create a logger for the scene at `scene_index` in the run.
    pub fn new(scene_token: &str, scene_index: usize) -> Self {
        Self {
            scene_token: scene_token.to_string(),
            scene_index,
        }
    }

    pub fn log_start(&self, samples: usize) {
        info!(
            scene = %self.scene_token,
            scene_index = self.scene_index,
            samples,
            "Scene started"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            scene = %self.scene_token,
            scene_index = self.scene_index,
            "Scene warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            scene = %self.scene_token,
            scene_index = self.scene_index,
            "Scene error: {}", message
        );
    }

    pub fn log_completion(&self, admitted: usize, rejected: usize, failed: usize) {
        info!(
            scene = %self.scene_token,
            scene_index = self.scene_index,
            admitted,
            rejected,
            failed,
            "Scene completed"
        );
    }

    pub fn scene_token(&self) -> &str {
        &self.scene_token
    }

    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    /// Create a tracing span for this scene.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "scene",
            scene = %self.scene_token,
            scene_index = self.scene_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_logger_creation() {
        let logger = SceneLogger::new("scene-0061", 3);
        assert_eq!(logger.scene_token(), "scene-0061");
        assert_eq!(logger.scene_index(), 3);
    }
}
