// ------------------------------------------------------------------------------- IMPORTS

use crate::geometry::VoxelGeometry;
use crate::lattice::boundary::PressureBoundary;
use crate::lattice::{CollisionStreamStep, LatticeField};
use crate::prelude_crate::*;
use crate::tracer::ConvergenceTracer;

// -------------------------------------------------------------------- STRUCT: Parameters

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub omega: Float,
    pub delta_p: Float,
    pub max_iterations: usize,
    pub snapshot_interval: usize,
    pub check_interval: usize,
    pub tracer_velocity: Float,
    pub tracer_length: Float,
    pub tracer_tolerance: Float,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            omega: OMEGA,
            delta_p: 0.0,
            max_iterations: MAX_ITERATIONS,
            snapshot_interval: SNAPSHOT_INTERVAL,
            check_interval: CHECK_INTERVAL,
            tracer_velocity: TRACER_VELOCITY,
            tracer_length: TRACER_LENGTH,
            tracer_tolerance: TRACER_TOLERANCE,
        }
    }
}

impl Parameters {
    /// # Examples
    /// ```
    /// # use lbperm::simulation::Parameters;
    /// let parameters = Parameters {
    ///     omega: 1.5,
    ///     ..Default::default()
    /// };
    ///
    /// assert!((parameters.get_viscosity() - 1.0 / 18.0).abs() < 1e-12);
    /// ```
    pub fn get_viscosity(&self) -> Float {
        (1.0 / self.omega - 0.5) / CS_2_INV
    }

    pub fn get_inlet_density(&self) -> Float {
        LATTICE_DENSITY
    }

    pub fn get_outlet_density(&self) -> Float {
        LATTICE_DENSITY - self.delta_p * CS_2_INV
    }

    fn validate(&self, geometry: &VoxelGeometry) -> LbResult<()> {
        if !(self.omega > 0.0 && self.omega <= 2.0) {
            return Err(LbError::InvalidArguments(format!(
                "Relaxation frequency must be in (0, 2], got {}",
                self.omega
            )));
        }
        if !self.delta_p.is_finite() {
            return Err(LbError::InvalidArguments(format!(
                "Pressure drop must be finite, got {}",
                self.delta_p
            )));
        }
        if geometry.get_nx() < 2 {
            return Err(LbError::InvalidArguments(
                "At least two X-layers are required to impose a pressure drop".to_string(),
            ));
        }
        if self.max_iterations == 0 || self.snapshot_interval == 0 || self.check_interval == 0 {
            return Err(LbError::InvalidArguments(
                "Iteration cap and intervals must be positive".to_string(),
            ));
        }
        if !(self.tracer_velocity > 0.0 && self.tracer_length > 0.0) {
            return Err(LbError::InvalidArguments(
                "Tracer velocity and length must be positive".to_string(),
            ));
        }
        if !(self.tracer_length / self.tracer_velocity).is_finite() {
            return Err(LbError::InvalidArguments(format!(
                "Tracer window must be finite, got length {} and velocity {}",
                self.tracer_length, self.tracer_velocity
            )));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------- ENUM: SimulationState

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    Converged,
    MaxIterationsReached,
}

// ------------------------------------------------------------- TRAIT: SimulationObserver

/// Data handed to observers after each iteration.
#[derive(Debug)]
pub struct IterationReport<'a> {
    pub iteration: usize,
    pub energy: Float,
    pub tracer: &'a ConvergenceTracer,
}

/// Callbacks invoked between steps. They see a read-only view of the field.
pub trait SimulationObserver {
    fn on_iteration(&mut self, _report: &IterationReport) -> LbResult<()> {
        Ok(())
    }

    fn on_snapshot(
        &mut self,
        _iteration: usize,
        _field: &LatticeField,
        _geometry: &VoxelGeometry,
    ) -> LbResult<()> {
        Ok(())
    }
}

pub struct NoObserver;

impl SimulationObserver for NoObserver {}

// -------------------------------------------------------------------- STRUCT: Simulation

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOutcome {
    pub state: SimulationState,
    pub iterations: usize,
    pub energy: Float,
}

#[derive(Debug)]
pub struct Simulation<'g> {
    geometry: &'g VoxelGeometry,
    field: LatticeField,
    collision_stream: CollisionStreamStep,
    inlet: PressureBoundary,
    outlet: PressureBoundary,
    tracer: ConvergenceTracer,
    parameters: Parameters,
    state: SimulationState,
    iteration: usize,
    energy: Float,
}

impl<'g> Simulation<'g> {
    pub fn new(geometry: &'g VoxelGeometry, parameters: Parameters) -> LbResult<Self> {
        parameters.validate(geometry)?;
        let field = LatticeField::with_pressure_gradient(geometry.get_n(), parameters.delta_p);
        let tracer = ConvergenceTracer::new(
            parameters.tracer_velocity,
            parameters.tracer_length,
            parameters.tracer_tolerance,
        );
        Ok(Simulation {
            geometry,
            field,
            collision_stream: CollisionStreamStep::new(parameters.omega),
            inlet: PressureBoundary::new(BoundaryFace::West, parameters.get_inlet_density()),
            outlet: PressureBoundary::new(BoundaryFace::East, parameters.get_outlet_density()),
            tracer,
            parameters,
            state: SimulationState::Running,
            iteration: 0,
            energy: 0.0,
        })
    }
}

impl Simulation<'_> {
    pub fn get_geometry(&self) -> &VoxelGeometry {
        self.geometry
    }

    pub fn get_field(&self) -> &LatticeField {
        &self.field
    }

    pub fn get_field_mut(&mut self) -> &mut LatticeField {
        &mut self.field
    }

    pub fn get_tracer(&self) -> &ConvergenceTracer {
        &self.tracer
    }

    pub fn get_parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn get_state(&self) -> SimulationState {
        self.state
    }

    pub fn get_iteration(&self) -> usize {
        self.iteration
    }

    pub fn get_energy(&self) -> Float {
        self.energy
    }

    pub fn get_viscosity(&self) -> Float {
        self.collision_stream.get_viscosity()
    }
}

impl Simulation<'_> {
    /// Performs one iteration of the time loop and returns the resulting state.
    pub fn step<O>(&mut self, observer: &mut O) -> LbResult<SimulationState>
    where
        O: SimulationObserver + ?Sized,
    {
        if self.state != SimulationState::Running {
            return Ok(self.state);
        }
        let iteration = self.iteration;
        if iteration % self.parameters.snapshot_interval == 0 && iteration > 0 {
            observer.on_snapshot(iteration, &self.field, self.geometry)?;
        }
        self.collision_stream.advance(&mut self.field, self.geometry);
        self.inlet.apply(&mut self.field, self.geometry);
        self.outlet.apply(&mut self.field, self.geometry);
        self.energy = self.field.compute_average_energy(self.geometry);
        self.tracer.take_value(self.energy);
        observer.on_iteration(&IterationReport {
            iteration,
            energy: self.energy,
            tracer: &self.tracer,
        })?;
        let converged = self.tracer.has_converged();
        let last = iteration + 1 >= self.parameters.max_iterations;
        if iteration % self.parameters.check_interval == 0 || converged || last {
            self.check_stability(iteration)?;
        }
        if converged {
            self.state = SimulationState::Converged;
        } else if last {
            self.state = SimulationState::MaxIterationsReached;
        } else {
            self.iteration += 1;
        }
        Ok(self.state)
    }

    /// Runs until the tracer converges or the iteration cap is reached.
    pub fn run<O>(&mut self, observer: &mut O) -> LbResult<SimulationOutcome>
    where
        O: SimulationObserver + ?Sized,
    {
        while self.step(observer)? == SimulationState::Running {}
        Ok(SimulationOutcome {
            state: self.state,
            iterations: self.iteration + 1,
            energy: self.energy,
        })
    }

    fn check_stability(&self, iteration: usize) -> LbResult<()> {
        if !self.energy.is_finite() {
            return Err(LbError::NumericalDivergence {
                iteration,
                reason: format!("average energy is {}", self.energy),
            });
        }
        match self.field.check_stability(self.geometry) {
            Some(reason) => Err(LbError::NumericalDivergence { iteration, reason }),
            None => Ok(()),
        }
    }
}
