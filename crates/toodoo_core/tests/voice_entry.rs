use toodoo_core::{
    ListeningState, MemoryKeyValueStore, SpeechError, SpeechEvent, SpeechSource, TaskBoard,
    TaskCategory, TaskStore, VoiceError, VoiceSession,
};

/// Recognizer double that records start/stop calls.
#[derive(Default)]
struct ScriptedRecognizer {
    supported: bool,
    starts: usize,
}

impl SpeechSource for ScriptedRecognizer {
    fn is_available(&self) -> bool {
        self.supported
    }

    fn start(&mut self) -> Result<(), SpeechError> {
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SpeechError> {
        Ok(())
    }
}

fn board() -> TaskBoard<MemoryKeyValueStore> {
    TaskBoard::new(TaskStore::new(MemoryKeyValueStore::new()))
}

fn session() -> VoiceSession<ScriptedRecognizer> {
    VoiceSession::new(ScriptedRecognizer {
        supported: true,
        ..ScriptedRecognizer::default()
    })
}

#[test]
fn spoken_explicit_add_creates_task() {
    let mut board = board();
    let mut session = session();

    assert_eq!(session.toggle().unwrap(), ListeningState::Listening);
    let outcome = board
        .handle_voice_event(
            &mut session,
            SpeechEvent::Result("Add call mom to my list".to_string()),
        )
        .unwrap();

    let id = outcome.created.unwrap();
    assert_eq!(board.store().get(id).unwrap().title, "call mom");
    assert_eq!(session.state(), ListeningState::Idle);
}

#[test]
fn spoken_category_hint_updates_ambient_selection() {
    let mut board = board();
    let mut session = session();

    session.start().unwrap();
    let outcome = board
        .handle_voice_event(
            &mut session,
            SpeechEvent::Result("Work meeting tomorrow".to_string()),
        )
        .unwrap();

    assert_eq!(outcome.category_update, Some(TaskCategory::Work));
    assert_eq!(board.ambient_category(), TaskCategory::Work);
    let id = outcome.created.unwrap();
    assert_eq!(board.store().get(id).unwrap().title, "meeting tomorrow");
}

#[test]
fn recognizer_error_resets_to_idle_without_touching_tasks() {
    let mut board = board();
    let mut session = session();

    session.start().unwrap();
    let outcome = board.handle_voice_event(&mut session, SpeechEvent::Error("no-speech".into()));

    assert!(outcome.is_none());
    assert!(!session.is_listening());
    assert!(board.store().is_empty());

    // A fresh session can start after the error.
    session.start().unwrap();
    assert_eq!(session.source().starts, 2);
}

#[test]
fn blank_transcript_is_a_silent_no_op() {
    let mut board = board();
    let mut session = session();

    session.start().unwrap();
    let outcome = board
        .handle_voice_event(&mut session, SpeechEvent::Result("   ".into()))
        .unwrap();
    assert_eq!(outcome.created, None);
    assert!(board.store().is_empty());
}

#[test]
fn unsupported_platform_keeps_manual_entry() {
    let mut board = board();
    let mut session = VoiceSession::new(ScriptedRecognizer::default());

    assert!(!session.is_available());
    assert_eq!(session.start().unwrap_err(), VoiceError::Unavailable);
    assert!(board.submit("typed by hand").is_some());
}

#[test]
fn transcript_arriving_after_mic_is_turned_off_still_adds_the_task() {
    let mut board = board();
    let mut session = session();

    assert_eq!(session.toggle().unwrap(), ListeningState::Listening);
    assert_eq!(session.toggle().unwrap(), ListeningState::Stopping);

    let outcome = board
        .handle_voice_event(
            &mut session,
            SpeechEvent::Result("add buy milk to my list".to_string()),
        )
        .unwrap();

    let id = outcome.created.unwrap();
    assert_eq!(board.store().get(id).unwrap().title, "buy milk");
    assert_eq!(board.store().len(), 1);
    assert_eq!(session.state(), ListeningState::Idle);

    assert!(board
        .handle_voice_event(&mut session, SpeechEvent::End)
        .is_none());
    assert!(board
        .handle_voice_event(&mut session, SpeechEvent::Result("add eggs to my list".into()))
        .is_none());
    assert_eq!(board.store().len(), 1);
}
