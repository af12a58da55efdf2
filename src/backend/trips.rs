use super::records::{DESTINATIONS, Destination, EXPENSES, Expense, TRIPS, Trip};
use super::{BackendClient, BackendError, Direction, Query};
use uuid::Uuid;

/// A trip with everything the itinerary and summary need.
#[derive(Debug, Clone, PartialEq)]
pub struct TripBundle {
    pub trip: Trip,
    pub destinations: Vec<Destination>,
    pub expenses: Vec<Expense>,
}

pub struct TripRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> TripRepository<'a> {
    pub fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn trip(&self, id: Uuid) -> Result<Trip, BackendError> {
        self.client
            .select_one(TRIPS, &Query::new().select("*").eq("id", id))
            .await
    }

    pub async fn destinations(&self, trip_id: Uuid) -> Result<Vec<Destination>, BackendError> {
        self.client
            .select(DESTINATIONS, &destinations_query(trip_id))
            .await
    }

    pub async fn expenses(&self, trip_id: Uuid) -> Result<Vec<Expense>, BackendError> {
        self.client.select(EXPENSES, &expenses_query(trip_id)).await
    }

    /// Loads the trip first so a missing id surfaces as `NotFound` before the
    /// child tables are queried.
    pub async fn load_bundle(&self, id: Uuid) -> Result<TripBundle, BackendError> {
        let trip = self.trip(id).await?;
        let (destinations, expenses) =
            tokio::try_join!(self.destinations(id), self.expenses(id))?;
        tracing::debug!(
            trip = %id,
            destinations = destinations.len(),
            expenses = expenses.len(),
            "Loaded trip bundle"
        );
        Ok(TripBundle {
            trip,
            destinations,
            expenses,
        })
    }
}

fn destinations_query(trip_id: Uuid) -> Query {
    Query::new()
        .select("*,trip_activities(*)")
        .eq("trip_id", trip_id)
        .order("list_order", Direction::Ascending)
}

fn expenses_query(trip_id: Uuid) -> Query {
    Query::new()
        .select("*")
        .eq("trip_id", trip_id)
        .order("expense_date", Direction::Descending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_query_embeds_activities_in_list_order() {
        let pairs = destinations_query(Uuid::nil()).to_pairs();
        assert!(pairs.contains(&("select".into(), "*,trip_activities(*)".into())));
        assert!(pairs.contains(&(
            "trip_id".into(),
            "eq.00000000-0000-0000-0000-000000000000".into()
        )));
        assert!(pairs.contains(&("order".into(), "list_order.asc".into())));
    }

    #[test]
    fn test_expense_query_is_newest_first() {
        let pairs = expenses_query(Uuid::nil()).to_pairs();
        assert!(pairs.contains(&("order".into(), "expense_date.desc".into())));
    }
}
