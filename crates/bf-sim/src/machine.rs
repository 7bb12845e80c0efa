//! The machine: a fixed simulation mode over an owned lattice.

use std::any::Any;
use std::fmt;
use std::path::Path;

use bf_config::{ElementConfig, MachineConfig, MachineDef, SimType};
use bf_core::{MachineId, format_matrix, next_machine_id};
use bf_lattice::{ElementSpec, Lattice, Params, Payload, PayloadShape};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::propagate::{Observations, Propagator};
use crate::state::{State, StateOptions};

/// Payload shape used by machines of the given mode.
pub fn payload_shape(sim_type: SimType) -> PayloadShape {
    match sim_type {
        SimType::Vector => PayloadShape::Vector,
        SimType::TransferMatrix => PayloadShape::Matrix,
    }
}

/// A configured lattice ready to propagate states.
///
/// Construction derives every element's transfer matrix up front; it fails
/// before any machine exists if one cannot be derived. States allocated here
/// are tagged with this machine's id and only propagate through it.
#[derive(Debug)]
pub struct Machine {
    id: MachineId,
    sim_type: SimType,
    lattice: Lattice,
}

impl Machine {
    pub fn new(config: &MachineConfig) -> SimResult<Self> {
        let shape = payload_shape(config.sim_type);
        let lattice = config.build_lattice()?;
        for element in lattice.iter() {
            element.check_shape(shape)?;
        }
        let id = next_machine_id();
        debug!(
            machine = %id,
            sim_type = %config.sim_type,
            elements = lattice.len(),
            "constructed machine"
        );
        Ok(Self {
            id,
            sim_type: config.sim_type,
            lattice,
        })
    }

    pub fn from_glps(source: &str) -> SimResult<Self> {
        Self::new(&bf_config::load_glps(source)?)
    }

    pub fn from_glps_with(source: &str, extra: &Params) -> SimResult<Self> {
        Self::new(&bf_config::load_glps_with(source, extra)?)
    }

    pub fn from_def(def: MachineDef) -> SimResult<Self> {
        Self::new(&def.into_config()?)
    }

    pub fn from_path(path: &Path, extra: &Params) -> SimResult<Self> {
        Self::new(&bf_config::load_path(path, extra)?)
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn sim_type(&self) -> SimType {
        self.sim_type
    }

    pub fn shape(&self) -> PayloadShape {
        payload_shape(self.sim_type)
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn len(&self) -> usize {
        self.lattice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lattice.is_empty()
    }

    pub fn element(&self, index: usize) -> SimResult<&ElementSpec> {
        self.check_index(index)?;
        Ok(self.lattice.get(index)?)
    }

    /// Indices of every element called `name`.
    pub fn find(&self, name: &str) -> Vec<usize> {
        self.lattice.find(name)
    }

    /// Current configuration, including any reconfigured parameters.
    pub fn to_config(&self) -> MachineConfig {
        let elements = self
            .lattice
            .iter()
            .map(|e| ElementConfig {
                name: e.name().to_string(),
                kind: e.kind(),
                params: e.params().clone(),
            })
            .collect();
        MachineConfig::new(self.sim_type, elements)
    }

    /// New state with the default payload and the cursor at element 0.
    pub fn alloc_state(&self) -> State {
        State::new(self.id, Payload::default_for(self.shape()), 0)
    }

    pub fn alloc_state_with(&self, options: StateOptions) -> SimResult<State> {
        let shape = self.shape();
        let payload = match &options.initial {
            Some(values) => Payload::from_values(shape, values)?,
            None => Payload::default_for(shape),
        };
        Ok(State::new(self.id, payload, options.next_elem))
    }

    /// Merge `params` into element `index` and re-derive it.
    ///
    /// On any error the lattice is left unchanged.
    pub fn reconfigure(&mut self, index: usize, params: Params) -> SimResult<()> {
        self.check_index(index)?;
        let candidate = self.lattice.get(index)?.reconfigured(params)?;
        candidate.check_shape(self.shape())?;
        self.lattice.replace(index, candidate)?;
        debug!(machine = %self.id, index, "reconfigured element");
        Ok(())
    }

    /// Put `element` in place of element `index`, as long as it fits this
    /// machine's mode.
    pub fn set_element(&mut self, index: usize, element: ElementSpec) -> SimResult<ElementSpec> {
        self.check_index(index)?;
        element.check_shape(self.shape())?;
        let previous = self.lattice.replace(index, element)?;
        debug!(machine = %self.id, index, "replaced element");
        Ok(previous)
    }

    /// Apply elements from the state's cursor to the end.
    ///
    /// With `observe`, returns a snapshot after each listed element that was
    /// applied, in ascending index order.
    pub fn propagate(
        &self,
        state: &State,
        observe: Option<&[usize]>,
    ) -> SimResult<Option<Observations>> {
        self.check_owner(state)?;
        let mut block = state.lock();
        let start = block.next_elem;
        Propagator {
            lattice: &self.lattice,
            start,
            max: usize::MAX,
            observe,
        }
        .run(&mut block)
    }

    /// Apply at most `max` elements starting at `start`.
    pub fn propagate_range(
        &self,
        state: &State,
        start: usize,
        max: usize,
        observe: Option<&[usize]>,
    ) -> SimResult<Option<Observations>> {
        self.check_owner(state)?;
        let mut block = state.lock();
        Propagator {
            lattice: &self.lattice,
            start,
            max,
            observe,
        }
        .run(&mut block)
    }

    /// Propagate a value of unknown type; anything but a [`State`] is rejected.
    pub fn propagate_dyn(
        &self,
        state: &dyn Any,
        observe: Option<&[usize]>,
    ) -> SimResult<Option<Observations>> {
        let state = state.downcast_ref::<State>().ok_or(SimError::NotAState)?;
        self.propagate(state, observe)
    }

    fn check_index(&self, index: usize) -> SimResult<()> {
        if index < self.lattice.len() {
            Ok(())
        } else {
            Err(SimError::IndexOutOfRange {
                index,
                len: self.lattice.len(),
            })
        }
    }

    fn check_owner(&self, state: &State) -> SimResult<()> {
        let owner = state.machine_id();
        if owner == self.id {
            Ok(())
        } else {
            Err(SimError::ForeignState {
                state_machine: owner,
                machine: self.id,
            })
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sim_type: {}", self.sim_type)?;
        writeln!(f, "#Elements: {}", self.lattice.len())?;
        for (i, element) in self.lattice.iter().enumerate() {
            writeln!(f, "Element {}: {} ({})", i, element.name(), element.kind())?;
        }
        if self.sim_type == SimType::Vector && self.lattice.len() == 1 {
            if let Some(element) = self.lattice.elements().first() {
                writeln!(f, "Transfer: {}", format_matrix(element.transfer()))?;
            }
        }
        Ok(())
    }
}
