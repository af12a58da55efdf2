//! Trip summary arithmetic and the itinerary email body.

use crate::backend::TripBundle;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, TemplateError,
};
use serde::Serialize;

pub const ACTIVITIES_CATEGORY: &str = "Activities";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostShare {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub trip_name: String,
    pub currency: String,
    /// Inclusive day count; `None` when either date is missing or the range is
    /// inverted.
    pub duration_days: Option<i64>,
    pub stops: usize,
    pub activities: usize,
    pub activity_cost: f64,
    pub expense_cost: f64,
    pub total_cost: f64,
    pub total_budget: f64,
    pub remaining_budget: f64,
    /// `Activities` first, then expense categories in first-seen order. Zero
    /// entries are omitted.
    pub breakdown: Vec<CostShare>,
}

impl TripSummary {
    pub fn from_bundle(bundle: &TripBundle) -> Self {
        let trip = &bundle.trip;

        let duration_days = match (trip.start_date, trip.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        };

        let activities = bundle
            .destinations
            .iter()
            .map(|d| d.trip_activities.len())
            .sum();
        let activity_cost: f64 = bundle
            .destinations
            .iter()
            .flat_map(|d| d.trip_activities.iter())
            .map(|a| a.cost.unwrap_or(0.0))
            .sum();
        let expense_cost: f64 = bundle.expenses.iter().map(|e| e.amount).sum();
        let total_cost = activity_cost + expense_cost;

        let mut breakdown = vec![CostShare {
            name: ACTIVITIES_CATEGORY.to_string(),
            value: activity_cost,
        }];
        for expense in &bundle.expenses {
            match breakdown
                .iter_mut()
                .skip(1)
                .find(|share| share.name == expense.category)
            {
                Some(share) => share.value += expense.amount,
                None => breakdown.push(CostShare {
                    name: expense.category.clone(),
                    value: expense.amount,
                }),
            }
        }
        breakdown.retain(|share| share.value > 0.0);

        Self {
            trip_name: trip.name.clone(),
            currency: trip.budget_currency.clone(),
            duration_days,
            stops: bundle.destinations.len(),
            activities,
            activity_cost,
            expense_cost,
            total_cost,
            total_budget: trip.total_budget,
            remaining_budget: trip.total_budget - total_cost,
            breakdown,
        }
    }
}

pub fn share_subject(trip_name: &str) -> String {
    format!("{} - Trip Itinerary", trip_name)
}

const SHARE_EMAIL: &str = "share_email";
const SHARE_EMAIL_TEMPLATE: &str = include_str!("../templates/share_email.hbs");

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareEmailContext<'a> {
    trip_name: &'a str,
    summary: Option<&'a TripSummary>,
}

fn format_currency_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let amount = h.param(0).and_then(|v| v.value().as_f64()).unwrap_or(0.0);
    out.write(&format!("{:.2}", amount))?;
    Ok(())
}

/// Handlebars registry for outgoing email bodies. Values are HTML-escaped.
pub struct EmailTemplates {
    engine: Handlebars<'static>,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut engine = Handlebars::new();
        engine.set_strict_mode(false);
        engine.register_helper("formatCurrency", Box::new(format_currency_helper));
        engine.register_template_string(SHARE_EMAIL, SHARE_EMAIL_TEMPLATE)?;
        Ok(Self { engine })
    }

    /// HTML body of the share email. The summary table is included when known.
    pub fn share_email_html(
        &self,
        trip_name: &str,
        summary: Option<&TripSummary>,
    ) -> Result<String, handlebars::RenderError> {
        self.engine
            .render(SHARE_EMAIL, &ShareEmailContext { trip_name, summary })
    }
}
