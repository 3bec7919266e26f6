// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::stdout;

use crossterm::{
    cursor, execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::error::{Error, Result};

/// Raw mode plus alternate screen for the lifetime of the value.
pub struct TerminalManager {
    initialized: bool,
}

impl TerminalManager {
    pub fn new() -> Result<Self> {
        let mut manager = Self { initialized: false };
        manager.initialize()?;
        Ok(manager)
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()
            .map_err(|e| Error::Terminal(format!("failed to enable raw mode: {e}")))?;

        let mut stdout = stdout();
        if let Err(e) = execute!(
            stdout,
            EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        ) {
            let _ = disable_raw_mode();
            return Err(Error::Terminal(format!(
                "failed to initialize terminal display: {e}"
            )));
        }

        self.initialized = true;
        Ok(())
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        if self.initialized {
            let mut stdout = stdout();
            // Leave alternate screen first to show termination message in normal screen
            let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();

            println!("Terminating...");
        }
    }
}
