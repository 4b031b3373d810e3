use strum_macros::{Display, IntoStaticStr};

/// Protocol state of a debugger session. Exactly one state is active at a time.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Display, IntoStaticStr)]
pub enum State {
    #[default]
    NotStarted,

    // --------------------------------- startup handshake -----------------------------------------
    /// Waiting for the first prompt, `set loadingmode manual` goes next.
    Starting1,
    /// `set checkpoints on|off` goes next.
    Starting1a,
    /// `set smallstep N` goes next.
    Starting1b,
    /// `set bigstep N` goes next.
    Starting1c,
    /// `set processcount N` goes next.
    Starting1d,
    /// `goto 0` goes next.
    Starting2,
    /// Waiting for a socket announcement, not for a prompt.
    Starting3,
    /// Debuggee connected, script file sourcing goes next.
    Starting3a,
    /// Last handshake prompt, the session becomes idle after it.
    Starting4,

    Idle,

    // --------------------------------- execution -------------------------------------------------
    Running,
    RunningBackwards,
    Stepping,
    BackStepping,
    SteppingOver,
    BackSteppingOver,
    StepReturn,
    BackstepReturn,
    Restarting,

    // --------------------------------- post-execution chain --------------------------------------
    Frame,
    BackTrace,
    DisplayWatchVars,
    DisplayingWatchVars,

    // --------------------------------- queries and mutations -------------------------------------
    PuttingBreakpoint,
    RemovingBreakpoint,
    RemovingBreakpoints,
    RemovedBreakpoints,
    Displaying,
    SettingFrame,
    Quitting,
}

impl State {
    /// Return debugger command that moves the program in this execution state.
    pub fn execution_command(self) -> Option<&'static str> {
        let cmd = match self {
            State::Running => "run",
            State::RunningBackwards => "reverse",
            State::Stepping => "step",
            State::BackStepping => "backstep",
            State::SteppingOver => "next",
            State::BackSteppingOver => "previous",
            State::StepReturn => "finish",
            State::BackstepReturn => "start",
            State::Restarting => "goto 0",
            _ => return None,
        };
        Some(cmd)
    }

    /// True for states that move the debuggee (forward or backward).
    pub fn is_execution(self) -> bool {
        self.execution_command().is_some()
    }

    /// True for execution states that travel back in time and need checkpoints.
    pub fn requires_checkpoints(self) -> bool {
        matches!(
            self,
            State::RunningBackwards
                | State::BackStepping
                | State::BackSteppingOver
                | State::BackstepReturn
                | State::Restarting
        )
    }

    /// True while the startup handshake is in progress.
    pub fn is_starting(self) -> bool {
        matches!(
            self,
            State::Starting1
                | State::Starting1a
                | State::Starting1b
                | State::Starting1c
                | State::Starting1d
                | State::Starting2
                | State::Starting3
                | State::Starting3a
                | State::Starting4
        )
    }
}
