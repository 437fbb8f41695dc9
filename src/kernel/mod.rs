//! # Fit Kernel
//!
//! [`FitKernel`] ties everything together: it owns the equation, its
//! variables and references, the fit configuration and the data space, and
//! fits every range of the data space in turn.
//!
//! ## Fitting a line to every slice
//!
//! ```
//! use datafit::data::Collection;
//! use datafit::kernel::FitKernel;
//! use datafit::minimize::MinimizationMethod;
//! use rand::SeedableRng;
//!
//! let mut data = Collection::new("data", vec![0.0, 1.0, 2.0, 3.0]);
//! data.add_slice("a", 0.0, vec![0.0, 2.0, 4.0, 6.0]).unwrap();
//! data.add_slice("b", 1.0, vec![0.0, 3.0, 6.0, 9.0]).unwrap();
//!
//! let mut kernel = FitKernel::new();
//! kernel.set_equation("m*x").unwrap();
//! kernel.set_source_collection(&data);
//! kernel.config_mut().method = MinimizationMethod::SteepestDescent;
//! kernel.config_mut().tolerance = 1e-10;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
//! assert!(report.is_success());
//! let slopes: Vec<f64> = kernel
//!     .data_space()
//!     .ranges()
//!     .iter()
//!     .map(|r| r.fitted_value("m").unwrap())
//!     .collect();
//! assert!((slopes[0] - 2.0).abs() < 1e-3);
//! assert!((slopes[1] - 3.0).abs() < 1e-3);
//! ```

pub mod config;
pub mod persist;
pub mod report;
pub mod state;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap};

use crate::data::{
    Axis, Collection, DataProvider, DataSpace, DataSpaceRange, ReferenceSample, SourceData,
};
use crate::equation::{is_reserved, Equation, EquationVariable, Expression, Limits, ReferenceVariable};
use crate::error::{FitError, Result};
use crate::minimize::{minimize, MinimizationMethod, MinimizeOptions, MinimizeResult};

pub use config::{AxisRange, FitConfig, RangeType};
pub use persist::{FittedValuesRecord, RangeValues};
pub use report::{FitReport, RangeFit, RangeResult};
pub use state::KernelState;

/// Orchestrates fitting an equation to every range of a data space.
pub struct FitKernel<E: Equation = Expression> {
    config: FitConfig,
    equation_text: String,
    equation: Option<E>,
    variables: Vec<EquationVariable>,
    references: Vec<ReferenceVariable>,
    source: Option<String>,
    space: DataSpace,
    state: KernelState,
    report: Option<FitReport>,
}

impl FitKernel<Expression> {
    /// Create a kernel using the built-in expression evaluator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a kernel with the given configuration
    pub fn with_config(config: FitConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

impl<E: Equation> Default for FitKernel<E> {
    fn default() -> Self {
        Self {
            config: FitConfig::default(),
            equation_text: String::new(),
            equation: None,
            variables: Vec::new(),
            references: Vec::new(),
            source: None,
            space: DataSpace::new(),
            state: KernelState::Configuring,
            report: None,
        }
    }
}

/// Everything the cost function of one range needs, shared by all ranges.
struct RangeProblem<'a, E> {
    equation: &'a E,
    fixed: &'a HashMap<String, f64>,
    fit_names: &'a [String],
    fit_limits: &'a [Limits],
    config: &'a FitConfig,
}

impl<'a, E: Equation> RangeProblem<'a, E> {
    /// Penalized sum of squared errors of `range` at `params`.
    fn cost(
        &self,
        range: &mut DataSpaceRange,
        bindings: &mut HashMap<String, f64>,
        references: &[ReferenceSample<'_>],
        params: &Array1<f64>,
    ) -> Result<f64> {
        for (name, value) in self.fit_names.iter().zip(params.iter()) {
            bindings.insert(name.clone(), *value);
        }
        range.calculate_values(self.equation, bindings, references)?;
        let sos = range.sum_squared_error();

        let penalty = 1.0
            + self
                .fit_limits
                .iter()
                .zip(params.iter())
                .map(|(limits, value)| limits.penalty(*value, self.config.limit_strength))
                .sum::<f64>();
        Ok(sos * penalty)
    }

    /// Minimize one range from `initial`, leaving its calculated values at the result.
    fn fit(
        &self,
        range: &mut DataSpaceRange,
        references: &[ReferenceSample<'_>],
        initial: &Array1<f64>,
        rng: &mut StdRng,
    ) -> Result<(MinimizeResult, RangeFit)> {
        let options = self.options(range);
        let mut bindings = self.fixed.clone();

        let result = minimize(
            self.config.method,
            |params: &Array1<f64>| self.cost(range, &mut bindings, references, params),
            initial,
            &options,
            rng,
        )?;

        // Leave the calculated grid at the best parameters
        let cost = self.cost(range, &mut bindings, references, &result.params)?;
        let values = self
            .fit_names
            .iter()
            .cloned()
            .zip(result.params.iter().copied())
            .collect();
        let fit = RangeFit {
            values,
            cost,
            sum_squared_error: range.sum_squared_error(),
            cells: range.cell_count(),
            iterations: result.iterations,
            func_evals: result.func_evals,
            status: result.status,
        };
        Ok((result, fit))
    }

    /// Random trial interval spanning the range's axis values and reference data.
    fn options(&self, range: &DataSpaceRange) -> MinimizeOptions {
        let (x_min, x_max) = range.x_bounds();
        let (z_min, z_max) = range.z_bounds();
        let low = x_min.min(z_min).min(range.reference_y_min());
        let high = x_max.max(z_max).max(range.reference_y_max());
        self.config.minimize_options((low, high))
    }

    /// Starting parameters for a range.
    fn seed(
        &self,
        range: &DataSpaceRange,
        variables: &[EquationVariable],
        start_from_unity: bool,
    ) -> Array1<f64> {
        self.fit_names
            .iter()
            .map(|name| {
                if start_from_unity {
                    1.0
                } else if self.config.roll_on {
                    variables
                        .iter()
                        .find(|v| &v.name == name)
                        .map_or(1.0, |v| v.value)
                } else {
                    range.fitted_value(name).unwrap_or(1.0)
                }
            })
            .collect()
    }
}

impl<E: Equation> FitKernel<E> {
    /*
     * Configuration
     */

    /// Current configuration
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Mutable configuration; returns the kernel to [`KernelState::Configuring`]
    pub fn config_mut(&mut self) -> &mut FitConfig {
        self.state = KernelState::Configuring;
        &mut self.config
    }

    /// Lifecycle state
    pub fn state(&self) -> KernelState {
        self.state
    }

    /*
     * Equation
     */

    /// Parse and set the equation.
    ///
    /// Every free identifier that is not reserved and not a reference becomes an
    /// equation variable (value `1.0`, no limits, fitted) if it does not exist
    /// yet. The `used` flags of all variables and references are recomputed.
    /// On a parse error no equation is set.
    pub fn set_equation(&mut self, text: &str) -> Result<()> {
        self.state = KernelState::Configuring;
        self.equation_text = text.to_string();
        match E::parse(text) {
            Ok(equation) => {
                self.equation = Some(equation);
                self.refresh_usage();
                log::info!("Equation set to '{}'", text);
                Ok(())
            }
            Err(err) => {
                self.equation = None;
                self.refresh_usage();
                Err(FitError::ParseError(err))
            }
        }
    }

    /// Re-parse the current equation text
    pub fn reset_equation(&mut self) -> Result<()> {
        if self.equation_text.trim().is_empty() {
            self.equation = None;
            self.refresh_usage();
            return Ok(());
        }
        let text = self.equation_text.clone();
        self.set_equation(&text)
    }

    /// Current equation text
    pub fn equation_text(&self) -> &str {
        &self.equation_text
    }

    /// Whether a valid equation is set
    pub fn has_equation(&self) -> bool {
        self.equation.is_some()
    }

    fn refresh_usage(&mut self) {
        let names: BTreeSet<String> = self
            .equation
            .as_ref()
            .map(|e| e.free_variable_names())
            .unwrap_or_default();

        for reference in self.references.iter_mut() {
            reference.used = names.contains(&reference.name);
        }
        for variable in self.variables.iter_mut() {
            variable.used = names.contains(&variable.name);
        }
        for name in &names {
            if is_reserved(name)
                || self.references.iter().any(|r| &r.name == name)
                || self.variables.iter().any(|v| &v.name == name)
            {
                continue;
            }
            let mut variable = EquationVariable::new(name);
            variable.used = true;
            self.variables.push(variable);
        }
    }

    /*
     * Variables
     */

    /// Every equation variable, used or not
    pub fn variables(&self) -> &[EquationVariable] {
        &self.variables
    }

    /// Equation variable by name
    pub fn variable(&self, name: &str) -> Option<&EquationVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Mutable equation variable by name
    pub fn variable_mut(&mut self, name: &str) -> Option<&mut EquationVariable> {
        self.state = KernelState::Configuring;
        self.variables.iter_mut().find(|v| v.name == name)
    }

    /// Variables referenced by the current equation
    pub fn used_variables(&self) -> impl Iterator<Item = &EquationVariable> {
        self.variables.iter().filter(|v| v.used)
    }

    /// Variables the minimizer will vary
    pub fn fit_variables(&self) -> impl Iterator<Item = &EquationVariable> {
        self.variables.iter().filter(|v| v.is_fitted())
    }

    /// Drop variables the current equation does not reference
    pub fn remove_unused_variables(&mut self) {
        self.variables.retain(|v| v.used);
    }

    /*
     * References
     */

    /// Every reference variable
    pub fn references(&self) -> &[ReferenceVariable] {
        &self.references
    }

    /// Reference variable by name
    pub fn reference(&self, name: &str) -> Option<&ReferenceVariable> {
        self.references.iter().find(|r| r.name == name)
    }

    /// Mutable reference variable by name
    pub fn reference_mut(&mut self, name: &str) -> Option<&mut ReferenceVariable> {
        self.state = KernelState::Configuring;
        self.references.iter_mut().find(|r| r.name == name)
    }

    /// Add a reference variable.
    ///
    /// Fails if `name` is reserved or already a reference. An equation variable
    /// of the same name is replaced by the reference.
    pub fn add_reference(&mut self, name: &str) -> Result<&mut ReferenceVariable> {
        if is_reserved(name) {
            return Err(FitError::ReservedName(name.to_string()));
        }
        if self.reference(name).is_some() {
            return Err(FitError::ReferenceExists(name.to_string()));
        }

        self.state = KernelState::Configuring;
        self.variables.retain(|v| v.name != name);
        self.references.push(ReferenceVariable::new(name));
        self.refresh_usage();

        let index = self.references.len() - 1;
        Ok(&mut self.references[index])
    }

    /// Remove a reference variable; a used reference forces the equation to be re-parsed
    pub fn remove_reference(&mut self, name: &str) -> Result<()> {
        let index = self
            .references
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| FitError::ReferenceNotFound(name.to_string()))?;

        self.state = KernelState::Configuring;
        let removed = self.references.remove(index);
        if removed.used {
            self.reset_equation()?;
        }
        Ok(())
    }

    /// First of `base`, `base1`, `base2`, ... not taken by a reference or a reserved name
    pub fn unique_reference_name(&self, base: &str) -> String {
        let taken = |name: &str| is_reserved(name) || self.reference(name).is_some();
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}{}", base, n))
            .find(|name| !taken(name))
            .unwrap_or_else(|| base.to_string())
    }

    /*
     * Source data and ranges
     */

    /// Use `source` as the data to fit, resetting both axis windows to span it.
    ///
    /// A collection with a single slice selects that slice only.
    pub fn set_source_collection(&mut self, source: &dyn SourceData) {
        self.state = KernelState::Configuring;
        self.source = Some(source.id().to_string());

        let z_values = z_values(source);
        self.config.x_range.set_defaults(source.abscissa());
        self.config.z_range.set_defaults(&z_values);
        if source.slice_count() == 1 {
            self.config.z_range.range_type = RangeType::SingleIndex;
        }
    }

    /// Id of the source collection
    pub fn source_collection(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Clamp the configured index windows into `source`
    pub fn check_ranges(&mut self, source: &dyn SourceData) {
        self.config.x_range.clamp(source.abscissa_length());
        self.config.z_range.clamp(source.slice_count());
    }

    /// Inclusive `(x_start, x_end, z_start, z_end)` index window the configuration selects in `source`
    pub fn fit_window(&self, source: &dyn SourceData) -> (usize, usize, usize, usize) {
        let (x_start, x_end) = self.config.x_range.resolve(source.abscissa());
        let (z_start, z_end) = self.config.z_range.resolve(&z_values(source));
        (x_start, x_end, z_start, z_end)
    }

    /// Rebuild the data space from the source collection and configuration
    pub fn initialise_data_space(&mut self, provider: &dyn DataProvider) -> Result<()> {
        let id = self.source.as_deref().ok_or(FitError::NoSourceCollection)?;
        let source = provider
            .collection(id)
            .ok_or_else(|| FitError::CollectionNotFound(id.to_string()))?;

        let (x_start, x_end, z_start, z_end) = self.fit_window(source);
        self.space.initialise(
            source,
            x_start,
            x_end,
            z_start,
            z_end,
            self.config.orthogonal,
            self.config.global,
        )
    }

    /// The fit data space
    pub fn data_space(&self) -> &DataSpace {
        &self.space
    }

    /// Number of ranges in the data space
    pub fn n_ranges(&self) -> usize {
        self.space.n_ranges()
    }

    /*
     * Fitting
     */

    /// Fit every range, drawing random trials from entropy.
    ///
    /// See [`fit_with_rng`](Self::fit_with_rng).
    pub fn fit(&mut self, provider: &dyn DataProvider, start_from_unity: bool) -> Result<&FitReport> {
        let mut rng = StdRng::from_entropy();
        self.fit_with_rng(provider, start_from_unity, &mut rng)
    }

    /// Fit every range of the data space.
    ///
    /// Each range is seeded (in priority order) with `1.0` if
    /// `start_from_unity`, the variable's current value if rolling on, the
    /// range's stored fitted value, or `1.0`. Fitted values are stored in
    /// both the variables and the range.
    ///
    /// Configuration errors (no equation, nothing to fit, too few parameters
    /// for the simplex, bad windows, missing collections) abort the fit and
    /// return the kernel to [`KernelState::Configuring`]. A range that fails
    /// to fit is recorded in the report and the remaining ranges are still
    /// attempted.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        provider: &dyn DataProvider,
        start_from_unity: bool,
        rng: &mut R,
    ) -> Result<&FitReport> {
        if self.state == KernelState::Done {
            log::debug!("Refitting; previous report discarded");
        }
        self.state = KernelState::Configuring;
        self.report = None;

        match self.prepare(provider) {
            Ok(()) => self.state = KernelState::Ready,
            Err(err) => {
                log::warn!("Fit not started: {}", err);
                return Err(err);
            }
        }

        // One seed per range, drawn in order so the result is independent of scheduling
        let seeds: Vec<u64> = (0..self.space.n_ranges()).map(|_| rng.gen()).collect();

        self.state = KernelState::Fitting;
        let report = self.fit_ranges(&seeds, start_from_unity)?;
        log::info!(
            "Fit complete: {} of {} range(s) fitted, overall RMSE {:e}",
            report.n_fitted(),
            report.ranges.len(),
            report.overall_rmse()
        );

        self.state = KernelState::Done;
        Ok(&*self.report.insert(report))
    }

    /// Report of the last completed fit
    pub fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    /// Validate the configuration and rebuild the data spaces.
    fn prepare(&mut self, provider: &dyn DataProvider) -> Result<()> {
        if self.equation.is_none() {
            return Err(FitError::InvalidEquation);
        }
        let n_fit = self.fit_variables().count();
        if n_fit == 0 {
            return Err(FitError::NoVariablesToFit);
        }
        if self.config.method == MinimizationMethod::Simplex && n_fit < 2 {
            return Err(FitError::Underdetermined { parameters: n_fit });
        }

        self.initialise_data_space(provider)?;

        let parent = self.source.as_deref().ok_or(FitError::NoSourceCollection)?;
        for reference in self.references.iter_mut().filter(|r| r.used) {
            reference.initialise_data_space(provider, parent, &self.space)?;
            reference.reset_cursor();
        }
        Ok(())
    }

    fn fit_ranges(&mut self, seeds: &[u64], start_from_unity: bool) -> Result<FitReport> {
        let Self {
            config,
            equation,
            variables,
            references,
            space,
            ..
        } = self;
        let equation = equation.as_ref().ok_or(FitError::InvalidEquation)?;

        let fixed: HashMap<String, f64> = variables
            .iter()
            .filter(|v| v.used && !v.fit)
            .map(|v| (v.name.clone(), v.value))
            .collect();
        let (fit_names, fit_limits): (Vec<String>, Vec<Limits>) = variables
            .iter()
            .filter(|v| v.is_fitted())
            .map(|v| (v.name.clone(), v.limits()))
            .unzip();

        let problem = RangeProblem {
            equation,
            fixed: &fixed,
            fit_names: &fit_names,
            fit_limits: &fit_limits,
            config,
        };

        let uses_references = references.iter().any(|r| r.used);
        let outcomes = if config.parallel && !config.roll_on && !uses_references {
            fit_parallel(&problem, space, variables, seeds, start_from_unity)
        } else {
            let mut outcomes = Vec::with_capacity(space.n_ranges());
            for (index, range) in space.ranges_mut().iter_mut().enumerate() {
                log_range_start(index, range);
                let initial = problem.seed(range, variables, start_from_unity);
                let mut rng = StdRng::seed_from_u64(seeds[index]);

                let outcome = match current_references(references) {
                    Ok(samples) => problem.fit(range, &samples, &initial, &mut rng),
                    Err(err) => Err(err),
                };
                let outcome = store_outcome(index, range, variables, outcome);
                outcomes.push(outcome);

                for reference in references.iter_mut().filter(|r| r.used) {
                    reference.advance();
                }
            }
            outcomes
        };

        let ranges = outcomes
            .into_iter()
            .zip(space.ranges())
            .enumerate()
            .map(|(index, (outcome, range))| RangeResult {
                index,
                x_window: (range.x_start(), range.x_end()),
                z_window: (range.z_start(), range.z_end()),
                outcome,
            })
            .collect();
        Ok(FitReport { ranges })
    }

    /// Penalized cost of range `index` at `params`, as seen by the minimizer.
    ///
    /// Leaves the range's calculated values at `params`. Requires the data
    /// space (and those of used references) to be initialised.
    pub fn cost(&mut self, index: usize, params: &[f64]) -> Result<f64> {
        let Self {
            config,
            equation,
            variables,
            references,
            space,
            ..
        } = self;
        let equation = equation.as_ref().ok_or(FitError::InvalidEquation)?;

        let fixed: HashMap<String, f64> = variables
            .iter()
            .filter(|v| v.used && !v.fit)
            .map(|v| (v.name.clone(), v.value))
            .collect();
        let (fit_names, fit_limits): (Vec<String>, Vec<Limits>) = variables
            .iter()
            .filter(|v| v.is_fitted())
            .map(|v| (v.name.clone(), v.limits()))
            .unzip();
        if params.len() != fit_names.len() {
            return Err(FitError::DimensionMismatch(format!(
                "{} parameters given for {} fit variables",
                params.len(),
                fit_names.len()
            )));
        }

        let n_ranges = space.n_ranges();
        let range = space
            .range_mut(index)
            .ok_or_else(|| FitError::InvalidState(format!(
                "range {} requested but the data space has {}",
                index, n_ranges
            )))?;
        let samples = references
            .iter()
            .filter(|r| r.used)
            .map(|r| {
                r.data_space()
                    .range(index)
                    .map(|range| ReferenceSample {
                        name: &r.name,
                        range,
                    })
                    .ok_or_else(|| FitError::InvalidState(format!(
                        "reference '{}' has no data for range {}",
                        r.name, index
                    )))
            })
            .collect::<Result<Vec<_>>>()?;

        let problem = RangeProblem {
            equation,
            fixed: &fixed,
            fit_names: &fit_names,
            fit_limits: &fit_limits,
            config,
        };
        let mut bindings = fixed.clone();
        problem.cost(range, &mut bindings, &samples, &Array1::from(params.to_vec()))
    }

    /// Root mean squared cost of range `index` at `params`, `0.0` if it has no cells
    pub fn rms_cost(&mut self, index: usize, params: &[f64]) -> Result<f64> {
        let cost = self.cost(index, params)?;
        let cells = self.space.range(index).map_or(0, DataSpaceRange::cell_count);
        if cells == 0 {
            return Ok(0.0);
        }
        Ok((cost / cells as f64).sqrt())
    }

    /*
     * Output
     */

    /// Collection of calculated values over the fit window, one `"Fit to: <name>"`
    /// slice per source slice
    pub fn calculated_collection(&self, provider: &dyn DataProvider) -> Result<Collection> {
        let id = self.source.as_deref().ok_or(FitError::NoSourceCollection)?;
        let source = provider
            .collection(id)
            .ok_or_else(|| FitError::CollectionNotFound(id.to_string()))?;
        self.space.calculated_collection(source)
    }

    /// Fitted values of every range
    pub fn export_fitted_values(&self) -> FittedValuesRecord {
        FittedValuesRecord::from_data_space(&self.space)
    }

    /// Restore fitted values into the ranges without fitting.
    ///
    /// Every range index is checked before anything is written.
    pub fn load_fitted_values(&mut self, record: &FittedValuesRecord) -> Result<()> {
        let n_ranges = self.space.n_ranges();
        if let Some(bad) = record.ranges.iter().find(|r| r.index >= n_ranges) {
            return Err(FitError::RangeError {
                axis: if self.space.is_orthogonal() { Axis::X } else { Axis::Z },
                min: bad.index,
                max: bad.index,
                available: n_ranges,
            });
        }

        for entry in &record.ranges {
            if let Some(range) = self.space.range_mut(entry.index) {
                for (name, value) in &entry.values {
                    range.set_fitted_value(name, *value);
                }
            }
        }
        Ok(())
    }
}

/// Slice z-labels of `source`, in order
fn z_values(source: &dyn SourceData) -> Vec<f64> {
    (0..source.slice_count())
        .filter_map(|i| source.slice(i).map(|s| s.z))
        .collect()
}

/// Reference samples under each used reference's cursor.
fn current_references(references: &[ReferenceVariable]) -> Result<Vec<ReferenceSample<'_>>> {
    references
        .iter()
        .filter(|r| r.used)
        .map(|r| {
            r.current_range()
                .map(|range| ReferenceSample {
                    name: &r.name,
                    range,
                })
                .ok_or_else(|| FitError::InvalidState(format!(
                    "reference '{}' has no range at position {}",
                    r.name,
                    r.cursor()
                )))
        })
        .collect()
}

fn log_range_start(index: usize, range: &DataSpaceRange) {
    let (x_min, x_max) = range.x_bounds();
    let (z_min, z_max) = range.z_bounds();
    log::info!(
        "Fitting range {} ({:e} < x < {:e}) ({:e} < z < {:e})",
        index,
        x_min,
        x_max,
        z_min,
        z_max
    );
}

/// Store a successful fit in the range and the variables, logging either way.
fn store_outcome(
    index: usize,
    range: &mut DataSpaceRange,
    variables: &mut [EquationVariable],
    outcome: Result<(MinimizeResult, RangeFit)>,
) -> Result<RangeFit> {
    match outcome {
        Ok((result, fit)) => {
            log::debug!("Range {}: {}", index, result.status.description());
            for (name, value) in &fit.values {
                log::info!("  {} = {:e}", name, value);
                range.set_fitted_value(name, *value);
                if let Some(variable) = variables.iter_mut().find(|v| &v.name == name) {
                    variable.value = *value;
                }
            }
            Ok(fit)
        }
        Err(err) => {
            log::warn!("Range {} failed: {}", index, err);
            Err(err)
        }
    }
}

#[cfg(feature = "parallel")]
fn fit_parallel<E: Equation>(
    problem: &RangeProblem<'_, E>,
    space: &mut DataSpace,
    variables: &mut [EquationVariable],
    seeds: &[u64],
    start_from_unity: bool,
) -> Vec<Result<RangeFit>> {
    use rayon::prelude::*;

    let outcomes: Vec<Result<(MinimizeResult, RangeFit)>> = space
        .ranges_mut()
        .par_iter_mut()
        .zip(seeds.par_iter())
        .enumerate()
        .map(|(index, (range, seed))| {
            log_range_start(index, range);
            let initial = problem.seed(range, &[], start_from_unity);
            let mut rng = StdRng::seed_from_u64(*seed);
            problem.fit(range, &[], &initial, &mut rng)
        })
        .collect();

    outcomes
        .into_iter()
        .zip(space.ranges_mut().iter_mut())
        .enumerate()
        .map(|(index, (outcome, range))| store_outcome(index, range, variables, outcome))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn fit_parallel<E: Equation>(
    problem: &RangeProblem<'_, E>,
    space: &mut DataSpace,
    variables: &mut [EquationVariable],
    seeds: &[u64],
    start_from_unity: bool,
) -> Vec<Result<RangeFit>> {
    space
        .ranges_mut()
        .iter_mut()
        .enumerate()
        .map(|(index, range)| {
            log_range_start(index, range);
            let initial = problem.seed(range, variables, start_from_unity);
            let mut rng = StdRng::seed_from_u64(seeds[index]);
            let outcome = problem.fit(range, &[], &initial, &mut rng);
            store_outcome(index, range, variables, outcome)
        })
        .collect()
}
