mod setup;

pub use setup::{
    cleanup_terminal_state as cleanup, install_panic_restore, setup_terminal as setup,
};
