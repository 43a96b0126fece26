use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Reports a press once, however long the key is held.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalaToggleTrigger {
  held: bool,
}

impl HalaToggleTrigger {

  /// Feed the current key state.
  /// param pressed: Whether the key is down.
  /// return: True on the frame the key goes down.
  pub fn update(&mut self, pressed: bool) -> bool {
    let fired = pressed && !self.held;
    self.held = pressed;
    fired
  }

}

/// The keyboard state of the cradle viewer.
#[derive(Clone, Debug, Default)]
pub struct HalaCradleInput {
  pub rotate_left: bool,
  pub rotate_right: bool,
  pub zoom_in: bool,
  pub zoom_out: bool,
  pub exit_requested: bool,
  toggle: HalaToggleTrigger,
  toggle_pending: bool,
}

impl HalaCradleInput {

  pub fn new() -> Self {
    Self::default()
  }

  /// Record a keyboard event.
  /// param key_code: The physical key.
  /// param state: Pressed or released.
  pub fn on_key(&mut self, key_code: KeyCode, state: ElementState) {
    let pressed = state == ElementState::Pressed;
    match key_code {
      KeyCode::Space => {
        if self.toggle.update(pressed) {
          self.toggle_pending = true;
        }
      },
      KeyCode::KeyE => self.rotate_left = pressed,
      KeyCode::KeyQ => self.rotate_right = pressed,
      KeyCode::Equal | KeyCode::NumpadAdd => self.zoom_in = pressed,
      KeyCode::Minus | KeyCode::NumpadSubtract => self.zoom_out = pressed,
      KeyCode::Escape => {
        if pressed {
          self.exit_requested = true;
        }
      },
      _ => {},
    }
  }

  /// Check if Space went down since the last call.
  pub fn take_toggle(&mut self) -> bool {
    std::mem::take(&mut self.toggle_pending)
  }

}
