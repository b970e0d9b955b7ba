//! Speech input abstraction and listening session.
//!
//! # Responsibility
//! - Hide the platform recognizer behind `SpeechSource`.
//! - Track the two-state listening toggle and turn recognizer events into
//!   transcripts for the command interpreter.
//!
//! # Invariants
//! - At most one listening session is active; a second start is rejected.
//! - Every recognizer error or end event returns the session to idle.
//! - After `stop`, the final result for audio already captured is still
//!   delivered; results after `End` or `Error` are dropped.
//! - An unavailable source never starts; manual entry keeps working.

use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The platform has no recognizer.
    Unsupported,
    /// Microphone or recognition permission was refused.
    NotAllowed,
    Failed(String),
}

impl Display for SpeechError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "speech recognition is not supported"),
            Self::NotAllowed => write!(f, "speech recognition permission denied"),
            Self::Failed(message) => write!(f, "speech recognition failed: {message}"),
        }
    }
}

impl Error for SpeechError {}

/// Platform speech recognizer.
///
/// Implementations deliver results out of band; the caller forwards them to
/// [`VoiceSession::handle_event`].
pub trait SpeechSource {
    /// Probed once when a session is created.
    fn is_available(&self) -> bool;
    fn start(&mut self) -> Result<(), SpeechError>;
    fn stop(&mut self) -> Result<(), SpeechError>;
}

/// Event delivered by a recognizer for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Final transcript of the single utterance.
    Result(String),
    Error(String),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
    /// Stop requested; the recognizer may still deliver its final result.
    Stopping,
}

/// Rejected session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    Unavailable,
    AlreadyListening,
    Source(SpeechError),
}

impl Display for VoiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "voice input is unavailable"),
            Self::AlreadyListening => write!(f, "a listening session is already active"),
            Self::Source(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VoiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SpeechError> for VoiceError {
    fn from(value: SpeechError) -> Self {
        Self::Source(value)
    }
}

/// Two-state listening controller around one recognizer.
pub struct VoiceSession<S: SpeechSource> {
    source: S,
    available: bool,
    state: ListeningState,
}

impl<S: SpeechSource> VoiceSession<S> {
    pub fn new(source: S) -> Self {
        let available = source.is_available();
        info!("event=voice_probe module=speech status=ok available={available}");
        Self {
            source,
            available,
            state: ListeningState::Idle,
        }
    }

    /// Whether voice controls should be offered at all.
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Starts a listening session.
    ///
    /// # Errors
    /// - `Unavailable` when the source failed the startup probe.
    /// - `AlreadyListening` when a session is active.
    /// - `Source` when the recognizer refuses to start; state stays idle.
    pub fn start(&mut self) -> Result<(), VoiceError> {
        if !self.available {
            return Err(VoiceError::Unavailable);
        }
        if self.is_listening() {
            return Err(VoiceError::AlreadyListening);
        }
        if let Err(err) = self.source.start() {
            error!("event=voice_start module=speech status=error error={err}");
            return Err(err.into());
        }
        self.state = ListeningState::Listening;
        debug!("event=voice_start module=speech status=ok");
        Ok(())
    }

    /// Stops the active session. Stopping while not listening is a no-op.
    ///
    /// The session waits in `Stopping` for the recognizer's final result or
    /// end event. A recognizer that fails to stop leaves the session idle.
    pub fn stop(&mut self) -> Result<(), VoiceError> {
        if !self.is_listening() {
            return Ok(());
        }
        if let Err(err) = self.source.stop() {
            self.state = ListeningState::Idle;
            warn!("event=voice_stop module=speech status=error error={err}");
            return Err(err.into());
        }
        self.state = ListeningState::Stopping;
        debug!("event=voice_stop module=speech status=ok");
        Ok(())
    }

    /// Starts when idle, stops when listening. Returns the new state.
    pub fn toggle(&mut self) -> Result<ListeningState, VoiceError> {
        if self.is_listening() {
            self.stop()?;
        } else {
            self.start()?;
        }
        Ok(self.state)
    }

    /// Applies a recognizer event and returns the transcript, if any.
    ///
    /// A result is accepted while listening or stopping. Results that arrive
    /// while idle belong to a finished session and are dropped.
    pub fn handle_event(&mut self, event: SpeechEvent) -> Option<String> {
        match event {
            SpeechEvent::Result(transcript) => {
                if self.state == ListeningState::Idle {
                    debug!("event=voice_result module=speech status=skip reason=idle");
                    return None;
                }
                self.state = ListeningState::Idle;
                debug!(
                    "event=voice_result module=speech status=ok chars={}",
                    transcript.chars().count()
                );
                Some(transcript)
            }
            SpeechEvent::Error(message) => {
                error!("event=voice_result module=speech status=error error={message}");
                self.state = ListeningState::Idle;
                None
            }
            SpeechEvent::End => {
                self.state = ListeningState::Idle;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListeningState, SpeechError, SpeechEvent, SpeechSource, VoiceError, VoiceSession};

    #[derive(Default)]
    struct FakeSource {
        unavailable: bool,
        refuse_start: bool,
        starts: usize,
        stops: usize,
    }

    impl SpeechSource for FakeSource {
        fn is_available(&self) -> bool {
            !self.unavailable
        }

        fn start(&mut self) -> Result<(), SpeechError> {
            if self.refuse_start {
                return Err(SpeechError::NotAllowed);
            }
            self.starts += 1;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), SpeechError> {
            self.stops += 1;
            Ok(())
        }
    }

    #[test]
    fn toggle_alternates_between_states() {
        let mut session = VoiceSession::new(FakeSource::default());
        assert_eq!(session.toggle().unwrap(), ListeningState::Listening);
        assert_eq!(session.toggle().unwrap(), ListeningState::Stopping);
        assert!(!session.is_listening());
        assert_eq!(session.handle_event(SpeechEvent::End), None);
        assert_eq!(session.state(), ListeningState::Idle);
        assert_eq!(session.source().starts, 1);
        assert_eq!(session.source().stops, 1);
    }

    #[test]
    fn final_result_after_stop_is_delivered_once() {
        let mut session = VoiceSession::new(FakeSource::default());
        session.start().unwrap();
        session.stop().unwrap();

        assert_eq!(
            session.handle_event(SpeechEvent::Result("buy milk".into())),
            Some("buy milk".to_string())
        );
        assert_eq!(session.state(), ListeningState::Idle);
        assert_eq!(session.handle_event(SpeechEvent::Result("again".into())), None);
    }

    #[test]
    fn end_after_stop_drops_later_results() {
        let mut session = VoiceSession::new(FakeSource::default());
        session.start().unwrap();
        session.stop().unwrap();

        assert_eq!(session.handle_event(SpeechEvent::End), None);
        assert_eq!(session.handle_event(SpeechEvent::Result("late".into())), None);
    }

    #[test]
    fn session_restarts_while_stopping() {
        let mut session = VoiceSession::new(FakeSource::default());
        session.start().unwrap();
        session.stop().unwrap();

        assert_eq!(session.toggle().unwrap(), ListeningState::Listening);
        assert_eq!(session.source().starts, 2);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut session = VoiceSession::new(FakeSource::default());
        session.start().unwrap();
        assert_eq!(session.start().unwrap_err(), VoiceError::AlreadyListening);
        assert_eq!(session.source().starts, 1);
    }

    #[test]
    fn unavailable_source_never_starts() {
        let mut session = VoiceSession::new(FakeSource {
            unavailable: true,
            ..FakeSource::default()
        });
        assert!(!session.is_available());
        assert_eq!(session.toggle().unwrap_err(), VoiceError::Unavailable);
        assert_eq!(session.source().starts, 0);
    }

    #[test]
    fn refused_start_stays_idle() {
        let mut session = VoiceSession::new(FakeSource {
            refuse_start: true,
            ..FakeSource::default()
        });
        let err = session.start().unwrap_err();
        assert_eq!(err, VoiceError::Source(SpeechError::NotAllowed));
        assert_eq!(session.state(), ListeningState::Idle);
    }

    #[test]
    fn events_return_session_to_idle() {
        let mut session = VoiceSession::new(FakeSource::default());

        session.start().unwrap();
        assert_eq!(
            session.handle_event(SpeechEvent::Result("buy milk".into())),
            Some("buy milk".to_string())
        );
        assert!(!session.is_listening());

        session.start().unwrap();
        assert_eq!(session.handle_event(SpeechEvent::Error("network".into())), None);
        assert!(!session.is_listening());

        assert_eq!(session.handle_event(SpeechEvent::Result("late".into())), None);
    }
}
