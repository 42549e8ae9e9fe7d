use std::cell::RefCell;
use std::rc::Rc;

use fire_common::control_unit::zone::ZoneContext;
use fire_common::hal::driver::ExternalInputs;

#[derive(Debug, Clone, Copy)]
struct FieldState {
    zone: ZoneContext,
    hood_ready: bool,
}

/// Zone classifier and hood stand-in returning configured values until
/// changed through a handle.
#[derive(Debug, Clone)]
pub struct SimField {
    state: Rc<RefCell<FieldState>>,
}

impl SimField {
    pub fn new(zone: ZoneContext, hood_ready: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(FieldState { zone, hood_ready })),
        }
    }

    pub fn set_zone(&self, zone: ZoneContext) {
        self.state.borrow_mut().zone = zone;
    }

    pub fn set_hood_ready(&self, ready: bool) {
        self.state.borrow_mut().hood_ready = ready;
    }
}

impl ExternalInputs for SimField {
    fn zone_context(&mut self) -> ZoneContext {
        self.state.borrow().zone
    }

    fn hood_at_setpoint(&mut self) -> bool {
        self.state.borrow().hood_ready
    }
}
