// ================================
// src/bin/remote_keyboard.rs - keyboard teleoperation
// ================================
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::{
    io::{self, Write},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::info;
use wall_following::{
    teleop::{KeyboardTeleop, TeleopKey},
    Config,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load().context("failed to load configuration")?;
    let mut teleop = KeyboardTeleop::new(config.teleop.clone());
    let poll_interval = Duration::from_millis(config.teleop.poll_interval_ms);

    info!("listening to keyboard (w/a/s/d, space = dead man's switch, q = quit)");

    enable_raw_mode().context("failed to enter raw mode")?;
    let result = key_loop(&mut teleop, poll_interval);
    // Restore the terminal even when the loop failed
    disable_raw_mode().context("failed to leave raw mode")?;

    result
}

fn key_loop(teleop: &mut KeyboardTeleop, poll_interval: Duration) -> Result<()> {
    let mut stdout = io::stdout().lock();

    loop {
        let key = match read_key(poll_interval)? {
            Some(TeleopKey::Quit) => return Ok(()),
            key => key,
        };

        let output = teleop.tick(key, now_ms());
        serde_json::to_writer(&mut stdout, &output)?;
        // raw mode: no implicit carriage return
        stdout.write_all(b"\r\n")?;
        stdout.flush()?;
    }
}

/// Waits up to `timeout` for a key press.
fn read_key(timeout: Duration) -> Result<Option<TeleopKey>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Ok(Some(TeleopKey::Quit))
            }
            KeyCode::Char(c) => Ok(TeleopKey::from_char(c)),
            KeyCode::Esc => Ok(Some(TeleopKey::Quit)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
