//! Built-in command handlers.
//!
//! Each handler illustrates one execution pattern the scheduler drives
//! uniformly:
//!
//! | Pattern | Commands |
//! |---------|----------|
//! | Synchronous (no execution) | `say`, `get_pos`, `kill`, `help`, `quit` |
//! | Timed | `wait` |
//! | Event-subscribed | `goto` |
//! | Meta-dispatch | `async` |

pub mod background;
pub mod get_pos;
pub mod goto;
pub mod help;
pub mod kill;
pub mod quit;
pub mod say;
pub mod wait;

use crate::handler::CommandHandler;


/// Every built-in handler, in registration order.
pub fn builtin() -> Vec<Box<dyn CommandHandler>> {
    vec![
        Box::new(say::SayCommand),
        Box::new(wait::WaitCommand),
        Box::new(background::AsyncCommand),
        Box::new(goto::GotoCommand),
        Box::new(get_pos::GetPosCommand),
        Box::new(kill::KillCommand),
        Box::new(help::HelpCommand),
        Box::new(quit::QuitCommand),
    ]
}
