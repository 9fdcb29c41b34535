/// Directional driving intents. The host maps the four arrow keys onto
/// these; the core never sees raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSignal {
    Accelerate,
    Brake,
    TurnLeft,
    TurnRight,
}

const SIGNAL_COUNT: usize = 4;

impl InputSignal {
    pub const ALL: [InputSignal; SIGNAL_COUNT] = [
        InputSignal::Accelerate,
        InputSignal::Brake,
        InputSignal::TurnLeft,
        InputSignal::TurnRight,
    ];

    const fn index(self) -> usize {
        match self {
            InputSignal::Accelerate => 0,
            InputSignal::Brake => 1,
            InputSignal::TurnLeft => 2,
            InputSignal::TurnRight => 3,
        }
    }

    /// Name of the physical control, used by the debug overlay.
    pub const fn label(self) -> &'static str {
        match self {
            InputSignal::Accelerate => "Up",
            InputSignal::Brake => "Down",
            InputSignal::TurnLeft => "Left",
            InputSignal::TurnRight => "Right",
        }
    }
}

/// Held control signals plus the monotonic select counter.
///
/// Press and release are idempotent projections into a set; keyboard and
/// pointer channels write here independently and the frame update reads
/// whatever is current when it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: [bool; SIGNAL_COUNT],
    select_counter: u64,
}

impl InputState {
    pub fn press(&mut self, signal: InputSignal) {
        self.held[signal.index()] = true;
    }

    pub fn release(&mut self, signal: InputSignal) {
        self.held[signal.index()] = false;
    }

    pub fn is_active(&self, signal: InputSignal) -> bool {
        self.held[signal.index()]
    }

    pub fn notify_select(&mut self) {
        self.select_counter = self.select_counter.saturating_add(1);
    }

    pub fn select_counter(&self) -> u64 {
        self.select_counter
    }

    pub fn active_signals(&self) -> impl Iterator<Item = InputSignal> + '_ {
        InputSignal::ALL
            .into_iter()
            .filter(|signal| self.is_active(*signal))
    }

    pub fn with_signal(mut self, signal: InputSignal) -> Self {
        self.press(signal);
        self
    }

    pub fn active_labels(&self) -> String {
        self.active_signals()
            .map(InputSignal::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
