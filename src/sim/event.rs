/// Signals raised during a simulation step.
/// The presentation layer consumes these for sound/HUD feedback.
/// Each fires at most once per triggering event: key-collected and the
/// terminal signals are one-shot per session, life-lost once per 0.2 s
/// threshold crossing.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    LifeLost,
    KeyCollected,
    GameWon,
    GameLost,
}
