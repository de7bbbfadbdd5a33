use neo4rs::query;
use thiserror::Error;
use tracing::debug;

use alertscope_common::MisconductType;

use crate::records::{
    AlertDetail, AlertSummary, NetworkConnection, NetworkPayload, OrderRecord, SearchCriteria,
    SearchPayload, TraderAlertsPayload, TypeAlertsPayload, TypedAlert,
};
use crate::GraphClient;

/// Upper bound on the variable-length traversal in `trader_network`.
/// The depth is interpolated into the query text (Bolt cannot bind a
/// variable-length upper bound), so it must never reach the query
/// builder unvalidated.
pub const MAX_NETWORK_DEPTH: u8 = 6;

#[derive(Debug, Error)]
pub enum GraphReadError {
    #[error("Connection error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Validate a traversal depth before it is spliced into query text.
pub fn validate_network_depth(depth: i64) -> Result<u8, GraphReadError> {
    if depth >= 1 && depth <= i64::from(MAX_NETWORK_DEPTH) {
        Ok(depth as u8)
    } else {
        Err(GraphReadError::Validation(format!(
            "network depth must be between 1 and {MAX_NETWORK_DEPTH}, got {depth}"
        )))
    }
}

/// Read-only wrapper for the surveillance graph. All five fixed traversal
/// queries live here; every user-supplied value binds as a query
/// parameter except the validated traversal depth.
pub struct AlertGraphReader {
    client: GraphClient,
}

impl AlertGraphReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// All alerts the named trader is involved in, each joined to its
    /// workflow and orders. Unknown traders yield an empty result set.
    pub async fn alerts_for_trader(
        &self,
        trader_name: &str,
        limit: i64,
    ) -> Result<TraderAlertsPayload, GraphReadError> {
        debug!(trader_name, limit, "alerts_for_trader");

        let q = query(
            "MATCH (t:Trader {name: $trader_name})-[:INVOLVED_IN]->(a:Alert)
             OPTIONAL MATCH (a)-[:HAS_WORKFLOW]->(w:Workflow)
             OPTIONAL MATCH (a)-[:CONTAINS]->(o:Order)
             RETURN a.alert_id AS alert_id,
                    a.alert_type AS alert_type,
                    toString(a.created_date) AS created_date,
                    a.status AS status,
                    w.commentary AS commentary,
                    w.disposition AS disposition,
                    collect(DISTINCT {
                        order_id: o.order_id,
                        asset_type: o.asset_type,
                        venue: o.venue_mic,
                        quantity: o.visible_usd_quantity,
                        placed_time: toString(o.placed_time),
                        cancelled_time: toString(o.cancelled_time),
                        executed_time: toString(o.executed_time),
                        is_algo: o.is_algo
                    }) AS orders
             ORDER BY created_date DESC
             LIMIT $limit",
        )
        .param("trader_name", trader_name)
        .param("limit", limit);

        let mut stream = self.client.graph.execute(q).await?;
        let mut alerts = Vec::new();
        while let Some(row) = stream.next().await? {
            alerts.push(row_to_summary(&row));
        }

        Ok(TraderAlertsPayload {
            trader_name: trader_name.to_string(),
            total_alerts: alerts.len(),
            alerts,
        })
    }

    /// The complete review picture for one alert: workflow, orders, and
    /// involved traders. `None` when no alert matches the id.
    pub async fn alert_workflow(
        &self,
        alert_id: &str,
    ) -> Result<Option<AlertDetail>, GraphReadError> {
        debug!(alert_id, "alert_workflow");

        let q = query(
            "MATCH (a:Alert {alert_id: $alert_id})
             OPTIONAL MATCH (a)-[:HAS_WORKFLOW]->(w:Workflow)
             OPTIONAL MATCH (a)-[:CONTAINS]->(o:Order)
             OPTIONAL MATCH (a)<-[:INVOLVED_IN]-(t:Trader)
             RETURN a.alert_id AS alert_id,
                    a.alert_type AS alert_type,
                    toString(a.created_date) AS created_date,
                    a.status AS status,
                    w.commentary AS commentary,
                    w.disposition AS disposition,
                    w.supervisor AS supervisor,
                    toString(w.review_date) AS review_date,
                    collect(DISTINCT t.name) AS traders,
                    collect(DISTINCT {
                        order_id: o.order_id,
                        asset_type: o.asset_type,
                        venue: o.venue_mic,
                        quantity: o.visible_usd_quantity,
                        placed_time: toString(o.placed_time),
                        cancelled_time: toString(o.cancelled_time),
                        executed_time: toString(o.executed_time),
                        is_algo: o.is_algo
                    }) AS orders",
        )
        .param("alert_id", alert_id);

        let mut stream = self.client.graph.execute(q).await?;
        match stream.next().await? {
            Some(row) => Ok(Some(row_to_detail(&row))),
            None => Ok(None),
        }
    }

    /// Alerts carrying an exact misconduct-type tag, joined to workflow
    /// and involved trader names.
    pub async fn alerts_by_type(
        &self,
        misconduct_type: &MisconductType,
        limit: i64,
    ) -> Result<TypeAlertsPayload, GraphReadError> {
        debug!(misconduct_type = %misconduct_type, limit, "alerts_by_type");

        let q = query(
            "MATCH (a:Alert {alert_type: $misconduct_type})
             OPTIONAL MATCH (a)-[:HAS_WORKFLOW]->(w:Workflow)
             OPTIONAL MATCH (a)<-[:INVOLVED_IN]-(t:Trader)
             RETURN a.alert_id AS alert_id,
                    a.alert_type AS alert_type,
                    toString(a.created_date) AS created_date,
                    a.status AS status,
                    w.commentary AS commentary,
                    w.disposition AS disposition,
                    collect(DISTINCT t.name) AS traders
             ORDER BY created_date DESC
             LIMIT $limit",
        )
        .param("misconduct_type", misconduct_type.as_str())
        .param("limit", limit);

        let mut stream = self.client.graph.execute(q).await?;
        let mut alerts = Vec::new();
        while let Some(row) = stream.next().await? {
            alerts.push(row_to_typed(&row));
        }

        Ok(TypeAlertsPayload {
            misconduct_type: misconduct_type.to_string(),
            total_alerts: alerts.len(),
            alerts,
        })
    }

    /// Breadth expansion of the undirected TRADES_WITH relation from the
    /// named trader, up to `depth` hops. Each reachable trader appears
    /// once with its minimum hop count and the relationship chain of one
    /// hop-minimal path; the central trader is excluded.
    pub async fn trader_network(
        &self,
        trader_name: &str,
        depth: i64,
    ) -> Result<NetworkPayload, GraphReadError> {
        let depth = validate_network_depth(depth)?;
        debug!(trader_name, depth, "trader_network");

        let q = query(&network_cypher(depth)).param("trader_name", trader_name);

        let mut stream = self.client.graph.execute(q).await?;
        let mut connected = Vec::new();
        while let Some(row) = stream.next().await? {
            connected.push(NetworkConnection {
                connected_trader: row.get("connected_trader").unwrap_or_default(),
                degrees_of_separation: row.get("degrees_of_separation").unwrap_or(0),
                relationships: row
                    .get("relationships")
                    .unwrap_or(serde_json::Value::Array(Vec::new())),
            });
        }

        Ok(NetworkPayload {
            central_trader: trader_name.to_string(),
            network_depth: depth,
            connected_traders: connected,
        })
    }

    /// Conjunction of only the provided criteria. Order-level filters
    /// (venue, asset type, minimum amount) are existential over the
    /// alert's collected orders and apply before the workflow/trader
    /// joins, so the joins only decorate surviving alerts.
    pub async fn search_alerts_by_criteria(
        &self,
        criteria: &SearchCriteria,
        limit: i64,
    ) -> Result<SearchPayload, GraphReadError> {
        debug!(?criteria, limit, "search_alerts_by_criteria");

        let clauses = build_criteria_clauses(criteria);
        let mut q = query(&search_cypher(&clauses)).param("limit", limit);

        if let Some(ref start_date) = criteria.start_date {
            q = q.param("start_date", start_date.as_str());
        }
        if let Some(ref end_date) = criteria.end_date {
            q = q.param("end_date", end_date.as_str());
        }
        if let Some(ref venue) = criteria.venue {
            q = q.param("venue", venue.as_str());
        }
        if let Some(ref asset_type) = criteria.asset_type {
            q = q.param("asset_type", asset_type.as_str());
        }
        if let Some(min_amount) = criteria.min_amount {
            q = q.param("min_amount", min_amount);
        }

        let mut stream = self.client.graph.execute(q).await?;
        let mut alerts = Vec::new();
        while let Some(row) = stream.next().await? {
            alerts.push(row_to_typed(&row));
        }

        Ok(SearchPayload {
            search_criteria: criteria.clone(),
            total_results: alerts.len(),
            alerts,
        })
    }
}

/// Assemble the variable-depth network query. `depth` has already been
/// validated; it is the only value ever interpolated into query text.
fn network_cypher(depth: u8) -> String {
    format!(
        "MATCH path = (t:Trader {{name: $trader_name}})-[:TRADES_WITH*1..{depth}]-(connected:Trader)
         WHERE connected.name <> $trader_name
         WITH connected.name AS connected_trader,
              length(path) AS hops,
              [rel IN relationships(path) | {{type: type(rel), properties: properties(rel)}}] AS rels
         ORDER BY hops
         WITH connected_trader,
              collect(hops)[0] AS degrees_of_separation,
              collect(rels)[0] AS relationships
         RETURN connected_trader, degrees_of_separation, relationships
         ORDER BY degrees_of_separation, connected_trader"
    )
}

/// The multi-criteria search, with whatever WHERE conjunction the caller
/// activated spliced between the order collection and the joins.
fn search_cypher(clauses: &[&str]) -> String {
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    format!(
        "MATCH (a:Alert)
         OPTIONAL MATCH (a)-[:CONTAINS]->(o:Order)
         WITH a, collect(o) AS orders
         {where_clause}
         OPTIONAL MATCH (a)-[:HAS_WORKFLOW]->(w:Workflow)
         OPTIONAL MATCH (a)<-[:INVOLVED_IN]-(t:Trader)
         RETURN a.alert_id AS alert_id,
                a.alert_type AS alert_type,
                toString(a.created_date) AS created_date,
                a.status AS status,
                w.commentary AS commentary,
                w.disposition AS disposition,
                collect(DISTINCT t.name) AS traders
         ORDER BY created_date DESC
         LIMIT $limit"
    )
}

/// Only clauses for criteria the caller actually supplied; each clause
/// references a parameter bound by the caller under the same name.
fn build_criteria_clauses(criteria: &SearchCriteria) -> Vec<&'static str> {
    let mut clauses = Vec::new();
    if criteria.start_date.is_some() {
        clauses.push("a.created_date >= date($start_date)");
    }
    if criteria.end_date.is_some() {
        clauses.push("a.created_date <= date($end_date)");
    }
    if criteria.venue.is_some() {
        clauses.push("ANY(o IN orders WHERE o.venue_mic = $venue)");
    }
    if criteria.asset_type.is_some() {
        clauses.push("ANY(o IN orders WHERE o.asset_type = $asset_type)");
    }
    if criteria.min_amount.is_some() {
        clauses.push("ANY(o IN orders WHERE o.visible_usd_quantity >= $min_amount)");
    }
    clauses
}

fn row_to_summary(row: &neo4rs::Row) -> AlertSummary {
    AlertSummary {
        alert_id: row.get("alert_id").ok(),
        alert_type: row.get("alert_type").ok(),
        created_date: row.get("created_date").ok(),
        status: row.get("status").ok(),
        commentary: row.get("commentary").ok(),
        disposition: row.get("disposition").ok(),
        orders: row.get::<Vec<OrderRecord>>("orders").unwrap_or_default(),
    }
}

fn row_to_typed(row: &neo4rs::Row) -> TypedAlert {
    TypedAlert {
        alert_id: row.get("alert_id").ok(),
        alert_type: row.get("alert_type").ok(),
        created_date: row.get("created_date").ok(),
        status: row.get("status").ok(),
        commentary: row.get("commentary").ok(),
        disposition: row.get("disposition").ok(),
        traders: row.get("traders").unwrap_or_default(),
    }
}

fn row_to_detail(row: &neo4rs::Row) -> AlertDetail {
    AlertDetail {
        alert_id: row.get("alert_id").ok(),
        alert_type: row.get("alert_type").ok(),
        created_date: row.get("created_date").ok(),
        status: row.get("status").ok(),
        commentary: row.get("commentary").ok(),
        disposition: row.get("disposition").ok(),
        supervisor: row.get("supervisor").ok(),
        review_date: row.get("review_date").ok(),
        traders: row.get("traders").unwrap_or_default(),
        orders: row.get::<Vec<OrderRecord>>("orders").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_bounds() {
        assert!(validate_network_depth(0).is_err());
        assert!(validate_network_depth(-3).is_err());
        assert_eq!(validate_network_depth(1).unwrap(), 1);
        assert_eq!(validate_network_depth(6).unwrap(), 6);
        assert!(validate_network_depth(7).is_err());
        assert!(validate_network_depth(i64::MAX).is_err());
    }

    #[test]
    fn network_query_uses_validated_depth() {
        let cypher = network_cypher(3);
        assert!(cypher.contains("[:TRADES_WITH*1..3]"));
        assert!(cypher.contains("connected.name <> $trader_name"));
    }

    #[test]
    fn no_criteria_means_no_where() {
        let criteria = SearchCriteria::default();
        assert!(criteria.is_empty());
        let clauses = build_criteria_clauses(&criteria);
        assert!(clauses.is_empty());
        assert!(!search_cypher(&clauses).contains("WHERE"));
    }

    #[test]
    fn venue_criterion_is_existential_over_orders() {
        let criteria = SearchCriteria {
            venue: Some("XNYS".to_string()),
            ..Default::default()
        };
        let clauses = build_criteria_clauses(&criteria);
        assert_eq!(clauses, vec!["ANY(o IN orders WHERE o.venue_mic = $venue)"]);
        let cypher = search_cypher(&clauses);
        assert!(cypher.contains("WHERE ANY(o IN orders WHERE o.venue_mic = $venue)"));
    }

    #[test]
    fn all_criteria_conjoin() {
        let criteria = SearchCriteria {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-06-30".into()),
            venue: Some("XNYS".into()),
            asset_type: Some("equity".into()),
            min_amount: Some(10_000.0),
        };
        let clauses = build_criteria_clauses(&criteria);
        assert_eq!(clauses.len(), 5);
        let cypher = search_cypher(&clauses);
        assert_eq!(cypher.matches(" AND ").count(), 4);
        // Filtering happens on the collected orders, before the joins.
        let where_pos = cypher.find("WHERE").unwrap();
        let join_pos = cypher.find("HAS_WORKFLOW").unwrap();
        assert!(where_pos < join_pos);
    }
}
