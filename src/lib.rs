use crate::definitions::Word;
use wasm_bindgen::prelude::*;

pub mod definitions;
pub mod keyboard;
pub mod parse;
pub mod simulators;
pub mod util;

use simulators::cpu::Status;
use simulators::{RunOutcome, Session};

#[wasm_bindgen]
pub fn get_key_code(key: &str) -> Option<u8> {
    keyboard::get_key_code(key)
}

#[wasm_bindgen]
pub struct App {
    session: Session,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl App {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        Self {
            session: Session::new(),
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn load(&mut self, source: &str) -> Result<(), JsError> {
        self.session.load(source)?;
        Ok(())
    }

    /// Single step, assembling the source first if nothing is loaded.
    /// Returns false once the program has halted
    ///
    /// The source is ignored while a program is loaded, so the editor has to call
    /// `reset` or `load` whenever its text changes
    pub fn step(&mut self, source: &str) -> Result<bool, JsError> {
        let status = self.session.single_step(source)?;
        Ok(status == Status::Continuing)
    }

    /// Run up to `steps` steps, called once per animation frame.
    /// Returns false once the program has halted
    pub fn tick(&mut self, steps: u32) -> Result<bool, JsError> {
        let summary = self.session.resume(steps as u64)?;
        Ok(summary.outcome != RunOutcome::Halted)
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_loaded()
    }

    /// Translate a key event and queue it, false if the key has no code or the buffer is full
    pub fn press_key(&mut self, key: &str) -> bool {
        match keyboard::get_key_code(key) {
            Some(code) => self.session.push_key(code),
            None => false,
        }
    }

    pub fn display_text(&self) -> String {
        self.session.display_text()
    }

    /// r0..r7 and sp
    pub fn registers(&self) -> Vec<Word> {
        self.session.cpu().registers().values().to_vec()
    }

    pub fn pc(&self) -> Word {
        self.session.cpu().registers().pc()
    }

    pub fn overflow(&self) -> bool {
        self.session.cpu().overflow()
    }

    /// index of the source line to highlight
    pub fn current_line(&self) -> Option<u32> {
        self.session.current_line().map(|line| line as u32)
    }

    pub fn register_table(&self) -> String {
        self.session.cpu().registers().to_string()
    }
}
