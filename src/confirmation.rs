//! Confirmation gate for destructive control-plane operations
//!
//! Every operation that stops, deletes, reboots, fails over, or otherwise
//! materially changes resource availability must be called twice: the first
//! call returns a [`ConfirmationChallenge`] describing the operation, the
//! resource, and the risk, and the second call must carry the exact required
//! confirmation value. No backend call is issued until the gate approves.

use serde::Serialize;

use crate::error::{Error, Result};

/// Placeholder substituted into identifier-scoped confirmation templates
const IDENTIFIER_PLACEHOLDER: &str = "{identifier}";

/// Shared confirmation literal for stop operations
pub const CONFIRM_STOP: &str = "CONFIRM_STOP";
/// Shared confirmation literal for start operations
pub const CONFIRM_START: &str = "CONFIRM_START";
/// Shared confirmation literal for reboot operations
pub const CONFIRM_REBOOT: &str = "CONFIRM_REBOOT";
/// Shared confirmation literal for failover operations
pub const CONFIRM_FAILOVER: &str = "CONFIRM_FAILOVER";
/// Shared confirmation literal for modify operations
pub const CONFIRM_MODIFY: &str = "CONFIRM_MODIFY";

/// Confirmation template for instance deletion; must echo the exact identifier
pub const CONFIRM_DELETE_INSTANCE: &str =
    "You are about to delete DB instance {identifier}. This operation cannot be undone.";
/// Confirmation template for cluster deletion; must echo the exact identifier
pub const CONFIRM_DELETE_CLUSTER: &str =
    "You are about to delete DB cluster {identifier}. This operation cannot be undone.";

/// Risk level of a destructive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Routine change, no availability impact
    Low,
    /// Reversible change that may briefly affect the resource
    Medium,
    /// Availability-affecting change
    High,
    /// Irreversible change (data loss possible)
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// The confirmation value an operation requires
///
/// Stop/start/reboot style operations share a fixed literal per operation
/// class. Delete operations are irreversible and resource-identifying, so
/// their value embeds the exact identifier: a confirmation copied from a
/// different resource's challenge never matches.
#[derive(Debug, Clone, Copy)]
pub enum RequiredToken {
    /// Fixed literal shared by an operation class (e.g. `CONFIRM_STOP`)
    Static(&'static str),
    /// Template with an `{identifier}` placeholder, matched after exact
    /// identifier substitution
    ForIdentifier(&'static str),
}

/// Impact details shown to the caller before they confirm
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OperationImpact {
    /// Expected downtime
    pub downtime: &'static str,
    /// Expected data loss
    pub data_loss: &'static str,
    /// Whether the operation can be undone
    pub reversible: &'static str,
    /// Rough duration estimate
    pub estimated_time: &'static str,
}

/// Static per-operation-kind confirmation descriptor
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationSpec {
    /// Operation name (snake_case, matches the tool surface)
    pub operation: &'static str,
    /// Human-readable operation name for challenge messages
    pub display_name: &'static str,
    /// Required confirmation value
    pub token: RequiredToken,
    /// Risk level
    pub risk: RiskLevel,
    /// Impact details
    pub impact: OperationImpact,
}

/// Per-invocation confirmation input
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationRequest<'a> {
    /// Resource type, e.g. "DB instance"
    pub resource_type: &'a str,
    /// Resource identifier
    pub identifier: &'a str,
    /// Caller-supplied confirmation value, absent on the first call
    pub confirmation: Option<&'a str>,
}

/// Structured response returned when confirmation is missing or mismatching
///
/// Terminal for the invocation: no backend call has occurred. The caller must
/// resubmit with `required_confirmation` to proceed.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationChallenge {
    /// Operation name
    pub operation: String,
    /// Resource type
    pub resource_type: String,
    /// Resource identifier
    pub identifier: String,
    /// Risk level
    pub risk_level: RiskLevel,
    /// The exact value the caller must supply to proceed
    pub required_confirmation: String,
    /// Human-readable warning
    pub warning: String,
    /// Impact details
    pub impact: OperationImpact,
}

impl ConfirmationSpec {
    /// The exact confirmation value required for the given resource
    pub fn required_confirmation(&self, identifier: &str) -> String {
        match self.token {
            RequiredToken::Static(literal) => literal.to_string(),
            RequiredToken::ForIdentifier(template) => {
                template.replace(IDENTIFIER_PLACEHOLDER, identifier)
            }
        }
    }

    /// Evaluate the gate for one invocation
    ///
    /// Returns `Ok(())` when the supplied confirmation exactly matches the
    /// required value; the invocation may then perform its mutation exactly
    /// once. A missing or mismatching confirmation short-circuits with
    /// [`Error::ConfirmationRequired`] carrying the challenge. The two cases
    /// are deliberately not distinguished in the response shape.
    pub fn evaluate(&self, request: &ConfirmationRequest<'_>) -> Result<()> {
        let required = self.required_confirmation(request.identifier);
        match request.confirmation {
            Some(supplied) if supplied == required => Ok(()),
            _ => Err(Error::ConfirmationRequired(Box::new(
                self.challenge(request, required),
            ))),
        }
    }

    fn challenge(
        &self,
        request: &ConfirmationRequest<'_>,
        required_confirmation: String,
    ) -> ConfirmationChallenge {
        let warning = format!(
            "⚠️ WARNING: You are about to perform an operation that may have significant impact.\n\
             \n\
             Please review the details below carefully before proceeding:\n\
             \n\
             - Operation: {}\n\
             - Resource: {} '{}'\n\
             - Risk Level: {}\n\
             \n\
             This operation requires explicit confirmation.\n\
             To confirm, please call this tool again with the confirmation parameter.",
            self.display_name, request.resource_type, request.identifier, self.risk,
        );
        ConfirmationChallenge {
            operation: self.operation.to_string(),
            resource_type: request.resource_type.to_string(),
            identifier: request.identifier.to_string(),
            risk_level: self.risk,
            required_confirmation,
            warning,
            impact: self.impact,
        }
    }
}

/// Spec for starting a DB instance
pub const START_INSTANCE: ConfirmationSpec = ConfirmationSpec {
    operation: "start_db_instance",
    display_name: "Start DB Instance",
    token: RequiredToken::Static(CONFIRM_START),
    risk: RiskLevel::Low,
    impact: OperationImpact {
        downtime: "None",
        data_loss: "None",
        reversible: "Yes - can be stopped again",
        estimated_time: "3-8 minutes",
    },
};

/// Spec for stopping a DB instance
pub const STOP_INSTANCE: ConfirmationSpec = ConfirmationSpec {
    operation: "stop_db_instance",
    display_name: "Stop DB Instance",
    token: RequiredToken::Static(CONFIRM_STOP),
    risk: RiskLevel::High,
    impact: OperationImpact {
        downtime: "Complete until started again",
        data_loss: "None",
        reversible: "Yes - can be started again",
        estimated_time: "3-8 minutes",
    },
};

/// Spec for rebooting a DB instance
pub const REBOOT_INSTANCE: ConfirmationSpec = ConfirmationSpec {
    operation: "reboot_db_instance",
    display_name: "Reboot DB Instance",
    token: RequiredToken::Static(CONFIRM_REBOOT),
    risk: RiskLevel::High,
    impact: OperationImpact {
        downtime: "Brief interruption",
        data_loss: "None expected",
        reversible: "Not applicable",
        estimated_time: "1-3 minutes",
    },
};

/// Spec for modifying a DB instance
pub const MODIFY_INSTANCE: ConfirmationSpec = ConfirmationSpec {
    operation: "modify_db_instance",
    display_name: "Modify DB Instance",
    token: RequiredToken::Static(CONFIRM_MODIFY),
    risk: RiskLevel::Medium,
    impact: OperationImpact {
        downtime: "Varies based on changes and apply_immediately setting",
        data_loss: "None expected",
        reversible: "Yes - can be modified again",
        estimated_time: "5-30 minutes",
    },
};

/// Spec for deleting a DB instance
pub const DELETE_INSTANCE: ConfirmationSpec = ConfirmationSpec {
    operation: "delete_db_instance",
    display_name: "Delete DB Instance",
    token: RequiredToken::ForIdentifier(CONFIRM_DELETE_INSTANCE),
    risk: RiskLevel::Critical,
    impact: OperationImpact {
        downtime: "Complete",
        data_loss: "Complete unless final snapshot is created",
        reversible: "No - unless restored from backup",
        estimated_time: "5-10 minutes",
    },
};

/// Spec for starting a DB cluster
pub const START_CLUSTER: ConfirmationSpec = ConfirmationSpec {
    operation: "start_db_cluster",
    display_name: "Start DB Cluster",
    token: RequiredToken::Static(CONFIRM_START),
    risk: RiskLevel::Low,
    impact: OperationImpact {
        downtime: "None",
        data_loss: "None",
        reversible: "Yes - can be stopped again",
        estimated_time: "3-8 minutes",
    },
};

/// Spec for stopping a DB cluster
pub const STOP_CLUSTER: ConfirmationSpec = ConfirmationSpec {
    operation: "stop_db_cluster",
    display_name: "Stop DB Cluster",
    token: RequiredToken::Static(CONFIRM_STOP),
    risk: RiskLevel::High,
    impact: OperationImpact {
        downtime: "Complete until started again",
        data_loss: "None",
        reversible: "Yes - can be started again",
        estimated_time: "3-8 minutes",
    },
};

/// Spec for rebooting a DB cluster
pub const REBOOT_CLUSTER: ConfirmationSpec = ConfirmationSpec {
    operation: "reboot_db_cluster",
    display_name: "Reboot DB Cluster",
    token: RequiredToken::Static(CONFIRM_REBOOT),
    risk: RiskLevel::High,
    impact: OperationImpact {
        downtime: "Brief interruption",
        data_loss: "None expected",
        reversible: "Not applicable",
        estimated_time: "2-5 minutes",
    },
};

/// Spec for failing over a DB cluster
pub const FAILOVER_CLUSTER: ConfirmationSpec = ConfirmationSpec {
    operation: "failover_db_cluster",
    display_name: "Failover DB Cluster",
    token: RequiredToken::Static(CONFIRM_FAILOVER),
    risk: RiskLevel::High,
    impact: OperationImpact {
        downtime: "Brief interruption",
        data_loss: "Uncommitted transactions may be lost",
        reversible: "Yes - can failover again",
        estimated_time: "1-3 minutes",
    },
};

/// Spec for deleting a DB cluster
pub const DELETE_CLUSTER: ConfirmationSpec = ConfirmationSpec {
    operation: "delete_db_cluster",
    display_name: "Delete DB Cluster",
    token: RequiredToken::ForIdentifier(CONFIRM_DELETE_CLUSTER),
    risk: RiskLevel::Critical,
    impact: OperationImpact {
        downtime: "Complete",
        data_loss: "Complete unless final snapshot is created",
        reversible: "No - unless restored from backup",
        estimated_time: "5-10 minutes",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(identifier: &'a str, confirmation: Option<&'a str>) -> ConfirmationRequest<'a> {
        ConfirmationRequest {
            resource_type: "DB instance",
            identifier,
            confirmation,
        }
    }

    fn challenge_of(err: Error) -> ConfirmationChallenge {
        match err {
            Error::ConfirmationRequired(challenge) => *challenge,
            other => panic!("expected confirmation challenge, got {other}"),
        }
    }

    #[test]
    fn missing_confirmation_is_challenged() {
        let err = STOP_INSTANCE.evaluate(&request("db-1", None)).unwrap_err();
        let challenge = challenge_of(err);
        assert_eq!(challenge.operation, "stop_db_instance");
        assert_eq!(challenge.identifier, "db-1");
        assert_eq!(challenge.required_confirmation, CONFIRM_STOP);
        assert_eq!(challenge.risk_level, RiskLevel::High);
        assert!(challenge.warning.contains("db-1"));
    }

    #[test]
    fn wrong_confirmation_gets_same_challenge_shape() {
        let missing = challenge_of(STOP_INSTANCE.evaluate(&request("db-1", None)).unwrap_err());
        let wrong = challenge_of(
            STOP_INSTANCE
                .evaluate(&request("db-1", Some("CONFIRM_START")))
                .unwrap_err(),
        );
        assert_eq!(missing.operation, wrong.operation);
        assert_eq!(missing.required_confirmation, wrong.required_confirmation);
        assert_eq!(missing.warning, wrong.warning);
    }

    #[test]
    fn exact_match_approves() {
        assert!(STOP_INSTANCE
            .evaluate(&request("db-1", Some("CONFIRM_STOP")))
            .is_ok());
    }

    #[test]
    fn delete_token_embeds_identifier() {
        let challenge = challenge_of(DELETE_INSTANCE.evaluate(&request("db-2", None)).unwrap_err());
        assert_eq!(
            challenge.required_confirmation,
            "You are about to delete DB instance db-2. This operation cannot be undone."
        );
    }

    #[test]
    fn delete_confirmation_for_other_resource_is_rejected() {
        // Token copied from db-3's challenge must not authorize db-2's delete.
        let other = DELETE_INSTANCE.required_confirmation("db-3");
        let err = DELETE_INSTANCE
            .evaluate(&request("db-2", Some(&other)))
            .unwrap_err();
        let challenge = challenge_of(err);
        assert_eq!(challenge.identifier, "db-2");
        assert!(challenge.required_confirmation.contains("db-2"));
    }

    #[test]
    fn approved_delete_with_exact_identifier() {
        let exact = DELETE_INSTANCE.required_confirmation("db-2");
        assert!(DELETE_INSTANCE
            .evaluate(&request("db-2", Some(&exact)))
            .is_ok());
    }

    #[test]
    fn cluster_delete_template_names_cluster() {
        assert_eq!(
            DELETE_CLUSTER.required_confirmation("aurora-1"),
            "You are about to delete DB cluster aurora-1. This operation cannot be undone."
        );
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::Critical).unwrap(),
            "\"critical\""
        );
    }
}
