//! Simple Workflow Service client restricted to the operations task handlers use

use aws_sdk_swf::operation::list_activity_types::builders::ListActivityTypesFluentBuilder;
use aws_sdk_swf::operation::poll_for_activity_task::builders::PollForActivityTaskFluentBuilder;
use aws_sdk_swf::operation::poll_for_decision_task::builders::PollForDecisionTaskFluentBuilder;
use aws_sdk_swf::operation::register_activity_type::builders::RegisterActivityTypeFluentBuilder;
use aws_sdk_swf::operation::respond_activity_task_canceled::builders::RespondActivityTaskCanceledFluentBuilder;
use aws_sdk_swf::operation::respond_activity_task_completed::builders::RespondActivityTaskCompletedFluentBuilder;
use aws_sdk_swf::operation::respond_activity_task_failed::builders::RespondActivityTaskFailedFluentBuilder;
use aws_sdk_swf::operation::respond_decision_task_completed::builders::RespondDecisionTaskCompletedFluentBuilder;
use aws_sdk_swf::operation::start_workflow_execution::builders::StartWorkflowExecutionFluentBuilder;
use aws_sdk_swf::operation::terminate_workflow_execution::builders::TerminateWorkflowExecutionFluentBuilder;
use std::fmt;

/// Operations exposed by [`WorkflowClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowOperation {
    StartWorkflowExecution,
    PollForDecisionTask,
    PollForActivityTask,
    RespondDecisionTaskCompleted,
    RespondActivityTaskCanceled,
    RespondActivityTaskCompleted,
    RespondActivityTaskFailed,
    ListActivityTypes,
    RegisterActivityType,
    TerminateWorkflowExecution,
}

impl WorkflowOperation {
    pub const ALL: [WorkflowOperation; 10] = [
        Self::StartWorkflowExecution,
        Self::PollForDecisionTask,
        Self::PollForActivityTask,
        Self::RespondDecisionTaskCompleted,
        Self::RespondActivityTaskCanceled,
        Self::RespondActivityTaskCompleted,
        Self::RespondActivityTaskFailed,
        Self::ListActivityTypes,
        Self::RegisterActivityType,
        Self::TerminateWorkflowExecution,
    ];

    /// SWF API operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartWorkflowExecution => "startWorkflowExecution",
            Self::PollForDecisionTask => "pollForDecisionTask",
            Self::PollForActivityTask => "pollForActivityTask",
            Self::RespondDecisionTaskCompleted => "respondDecisionTaskCompleted",
            Self::RespondActivityTaskCanceled => "respondActivityTaskCanceled",
            Self::RespondActivityTaskCompleted => "respondActivityTaskCompleted",
            Self::RespondActivityTaskFailed => "respondActivityTaskFailed",
            Self::ListActivityTypes => "listActivityTypes",
            Self::RegisterActivityType => "registerActivityType",
            Self::TerminateWorkflowExecution => "terminateWorkflowExecution",
        }
    }

    /// `None` for anything outside the allow-list
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for WorkflowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SWF client exposing only [`WorkflowOperation::ALL`]
///
/// Each method returns the SDK request builder; `.send().await` performs the call.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    inner: aws_sdk_swf::Client,
}

impl WorkflowClient {
    pub fn new(client: aws_sdk_swf::Client) -> Self {
        Self { inner: client }
    }

    /// Whether `operation` is callable through this client
    pub fn supports(operation: &str) -> bool {
        WorkflowOperation::from_name(operation).is_some()
    }

    pub fn region(&self) -> Option<&str> {
        self.inner.config().region().map(|r| r.as_ref())
    }

    pub fn start_workflow_execution(&self) -> StartWorkflowExecutionFluentBuilder {
        self.inner.start_workflow_execution()
    }

    pub fn poll_for_decision_task(&self) -> PollForDecisionTaskFluentBuilder {
        self.inner.poll_for_decision_task()
    }

    pub fn poll_for_activity_task(&self) -> PollForActivityTaskFluentBuilder {
        self.inner.poll_for_activity_task()
    }

    pub fn respond_decision_task_completed(&self) -> RespondDecisionTaskCompletedFluentBuilder {
        self.inner.respond_decision_task_completed()
    }

    pub fn respond_activity_task_canceled(&self) -> RespondActivityTaskCanceledFluentBuilder {
        self.inner.respond_activity_task_canceled()
    }

    pub fn respond_activity_task_completed(&self) -> RespondActivityTaskCompletedFluentBuilder {
        self.inner.respond_activity_task_completed()
    }

    pub fn respond_activity_task_failed(&self) -> RespondActivityTaskFailedFluentBuilder {
        self.inner.respond_activity_task_failed()
    }

    pub fn list_activity_types(&self) -> ListActivityTypesFluentBuilder {
        self.inner.list_activity_types()
    }

    pub fn register_activity_type(&self) -> RegisterActivityTypeFluentBuilder {
        self.inner.register_activity_type()
    }

    pub fn terminate_workflow_execution(&self) -> TerminateWorkflowExecutionFluentBuilder {
        self.inner.terminate_workflow_execution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_names_round_trip() {
        for op in WorkflowOperation::ALL {
            assert_eq!(WorkflowOperation::from_name(op.name()), Some(op));
        }
    }

    #[test]
    fn test_operations_outside_allow_list() {
        for name in [
            "deleteDomain",
            "signalWorkflowExecution",
            "registerDomain",
            "StartWorkflowExecution",
            "",
        ] {
            assert!(!WorkflowClient::supports(name), "{name}");
        }
        assert!(WorkflowClient::supports("terminateWorkflowExecution"));
    }
}
