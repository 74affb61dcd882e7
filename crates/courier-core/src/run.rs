//! A full day of deliveries.
//!
//! Orders are flown in the given order. A failed order is rolled back and
//! skipped; it never stops the run. After the last order the drone flies home.

use crate::catalog::Catalog;
use crate::config::FlightConfig;
use crate::error::{ConfigError, FailureKind, MissionError};
use crate::mission::MissionController;
use crate::models::{Delivery, FlightMove, Order};
use crate::no_fly::NoFlyIndex;
use crate::orders::{resolve_order, LocationResolver};

/// What happened to one order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderOutcome {
    pub order_no: String,
    pub cost_in_pence: u32,
    pub moves: u32,
    pub failure: Option<(FailureKind, String)>,
}

impl OrderOutcome {
    pub fn delivered(&self) -> bool {
        self.failure.is_none()
    }
}

/// Summary of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub deliveries: Vec<Delivery>,
    pub outcomes: Vec<OrderOutcome>,
    pub attempted: usize,
    pub delivered: usize,
    pub total_value_pence: u64,
    pub delivered_value_pence: u64,
    pub moves_remaining: u32,
    pub returned_to_base: bool,
    pub flight_log: Vec<FlightMove>,
}

impl RunReport {
    /// Share of the day's order value that was delivered, as a percentage.
    /// A day with nothing of value to deliver counts as complete.
    pub fn monetary_percentage(&self) -> f64 {
        if self.total_value_pence == 0 {
            return 100.0;
        }
        self.delivered_value_pence as f64 / self.total_value_pence as f64 * 100.0
    }
}

/// Drives the mission controller over a list of orders.
pub struct DeliveryRun {
    controller: MissionController,
    catalog: Catalog,
}

impl DeliveryRun {
    pub fn new(config: FlightConfig, zones: NoFlyIndex, catalog: Catalog) -> Result<Self, ConfigError> {
        if zones.is_empty() {
            return Err(ConfigError::EmptyObstacles);
        }
        let controller = MissionController::new(config, zones)?;
        Ok(Self {
            controller,
            catalog,
        })
    }

    pub fn controller(&self) -> &MissionController {
        &self.controller
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fly every order, then return to base under the last delivered order's number.
    pub fn run<R: LocationResolver + ?Sized>(mut self, orders: &[Order], resolver: &mut R) -> RunReport {
        let mut report = RunReport::default();
        let mut last_delivered: Option<String> = None;

        tracing::info!("Starting delivery run: {} orders", orders.len());

        for order in orders {
            report.attempted += 1;
            let cost = match self.catalog.delivery_cost(&order.items) {
                Ok(cost) => cost,
                Err(e) => {
                    tracing::warn!("Order {} has no valid price: {}", order.order_no, e);
                    0
                }
            };
            report.total_value_pence += u64::from(cost);

            let result = resolve_order(order, &self.catalog, resolver)
                .map_err(MissionError::from)
                .and_then(|mission| self.controller.execute(&mission));

            match result {
                Ok(moves) => {
                    report.delivered += 1;
                    report.delivered_value_pence += u64::from(cost);
                    report.deliveries.push(Delivery {
                        order_no: order.order_no.clone(),
                        delivered_to: order.deliver_to.clone(),
                        cost_in_pence: cost,
                    });
                    report.outcomes.push(OrderOutcome {
                        order_no: order.order_no.clone(),
                        cost_in_pence: cost,
                        moves,
                        failure: None,
                    });
                    last_delivered = Some(order.order_no.clone());
                }
                Err(e) => {
                    let kind = e.kind();
                    if e.is_invariant_violation() {
                        tracing::error!("Order {} hit an invariant violation: {}", order.order_no, e);
                    } else {
                        tracing::warn!("Order {} not delivered ({:?}): {}", order.order_no, kind, e);
                    }
                    report.outcomes.push(OrderOutcome {
                        order_no: order.order_no.clone(),
                        cost_in_pence: cost,
                        moves: 0,
                        failure: Some((kind, e.to_string())),
                    });
                }
            }
        }

        report.returned_to_base = self.controller.is_at_base();
        if let Some(order_no) = last_delivered {
            if !report.returned_to_base {
                match self.controller.return_to_base(&order_no) {
                    Ok(_) => report.returned_to_base = true,
                    Err(e) => tracing::error!("Could not return to base: {}", e),
                }
            }
        }

        report.moves_remaining = self.controller.moves_remaining();
        report.flight_log = self.controller.into_flight_log();
        tracing::info!(
            "Run finished: {}/{} delivered, {:.2}% of value, {} moves left",
            report.delivered,
            report.attempted,
            report.monetary_percentage(),
            report.moves_remaining
        );
        report
    }
}
