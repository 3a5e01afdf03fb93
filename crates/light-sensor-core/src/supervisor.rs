//! Bounded-retry WiFi connection supervisor.
//!
//! The supervisor does no I/O. The WiFi task feeds it [`LinkEvent`]s as the
//! radio and the IP stack report progress, and carries out the [`Action`]
//! each event produces.

use log::{info, warn};

/// Connection lifecycle as seen by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Failed,
    /// Station mode skipped at the user's request
    AccessPoint,
}

/// Link level happenings reported by the WiFi task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Radio started in station mode
    Started,
    /// Association lost, or a connection attempt did not complete
    Disconnected,
    /// DHCP lease obtained
    AddressAcquired,
    /// Config button held at boot
    AccessPointRequested,
}

/// What to do once every retry has been spent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure to the waiter and stay offline
    GiveUp,
    /// Stop the station and host a local access point instead
    AccessPointFallback,
}

/// How the device ended up on a network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Joined the configured network and holds a DHCP lease
    Station,
    /// Hosting its own network
    AccessPoint,
}

/// Work requested from the WiFi task in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Start a connection attempt. `attempt` is 0 for the first try and the
    /// retry number afterwards.
    Connect { attempt: u8 },
    SignalConnected,
    GiveUp,
    FallBackToAccessPoint,
}

#[derive(Debug)]
pub struct ConnectionSupervisor {
    state: ConnectionState,
    retries: u8,
    max_retries: u8,
    policy: FailurePolicy,
}

impl ConnectionSupervisor {
    pub const fn new(max_retries: u8, policy: FailurePolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            retries: 0,
            max_retries,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn handle(&mut self, event: LinkEvent) -> Action {
        match (self.state, event) {
            (
                ConnectionState::Failed | ConnectionState::AccessPoint,
                LinkEvent::Started | LinkEvent::Disconnected | LinkEvent::AccessPointRequested,
            ) => Action::None,

            (_, LinkEvent::AccessPointRequested) => {
                info!("Access point requested, skipping station mode");
                self.state = ConnectionState::AccessPoint;
                Action::FallBackToAccessPoint
            }

            (_, LinkEvent::Started) => {
                info!("WiFi started, connecting...");
                self.retries = 0;
                self.state = ConnectionState::Connecting;
                Action::Connect { attempt: 0 }
            }

            (ConnectionState::Idle, LinkEvent::Disconnected) => Action::None,

            (_, LinkEvent::Disconnected) => {
                if self.retries < self.max_retries {
                    self.retries += 1;
                    self.state = ConnectionState::Connecting;
                    info!("Retry to connect ({}/{})", self.retries, self.max_retries);
                    Action::Connect {
                        attempt: self.retries,
                    }
                } else {
                    self.state = ConnectionState::Failed;
                    warn!("Failed to connect after {} attempts", self.max_retries);
                    match self.policy {
                        FailurePolicy::GiveUp => Action::GiveUp,
                        FailurePolicy::AccessPointFallback => Action::FallBackToAccessPoint,
                    }
                }
            }

            (_, LinkEvent::AddressAcquired) => {
                self.retries = 0;
                self.state = ConnectionState::Connected;
                Action::SignalConnected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(max_retries: u8, policy: FailurePolicy) -> ConnectionSupervisor {
        let mut supervisor = ConnectionSupervisor::new(max_retries, policy);
        assert_eq!(
            supervisor.handle(LinkEvent::Started),
            Action::Connect { attempt: 0 }
        );
        supervisor
    }

    #[test]
    fn starts_idle() {
        let supervisor = ConnectionSupervisor::new(3, FailurePolicy::GiveUp);
        assert_eq!(supervisor.state(), ConnectionState::Idle);
        assert_eq!(supervisor.retries(), 0);
    }

    #[test]
    fn link_started_begins_connecting() {
        let supervisor = started(3, FailurePolicy::GiveUp);
        assert_eq!(supervisor.state(), ConnectionState::Connecting);
        assert_eq!(supervisor.retries(), 0);
    }

    #[test]
    fn drop_below_limit_retries_and_counts() {
        let mut supervisor = started(3, FailurePolicy::GiveUp);
        for expected in 1..=3 {
            assert_eq!(
                supervisor.handle(LinkEvent::Disconnected),
                Action::Connect { attempt: expected }
            );
            assert_eq!(supervisor.retries(), expected);
            assert_eq!(supervisor.state(), ConnectionState::Connecting);
        }
    }

    #[test]
    fn exhausted_retries_fail_exactly_once() {
        let mut supervisor = started(3, FailurePolicy::GiveUp);
        for _ in 0..3 {
            supervisor.handle(LinkEvent::Disconnected);
        }

        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::GiveUp);
        assert_eq!(supervisor.state(), ConnectionState::Failed);
        assert_eq!(supervisor.retries(), 3);

        for _ in 0..5 {
            assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::None);
        }
        assert_eq!(supervisor.handle(LinkEvent::Started), Action::None);
        assert_eq!(supervisor.retries(), 3);
    }

    #[test]
    fn retry_count_never_exceeds_limit() {
        let mut supervisor = started(2, FailurePolicy::GiveUp);
        for _ in 0..10 {
            supervisor.handle(LinkEvent::Disconnected);
            assert!(supervisor.retries() <= supervisor.max_retries());
        }
    }

    #[test]
    fn zero_retries_fails_on_first_drop() {
        let mut supervisor = started(0, FailurePolicy::GiveUp);
        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::GiveUp);
    }

    #[test]
    fn fallback_policy_requests_access_point() {
        let mut supervisor = started(1, FailurePolicy::AccessPointFallback);
        supervisor.handle(LinkEvent::Disconnected);
        assert_eq!(
            supervisor.handle(LinkEvent::Disconnected),
            Action::FallBackToAccessPoint
        );
        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::None);
    }

    #[test]
    fn address_acquired_resets_retries() {
        let mut supervisor = started(3, FailurePolicy::GiveUp);
        supervisor.handle(LinkEvent::Disconnected);
        supervisor.handle(LinkEvent::Disconnected);
        assert_eq!(supervisor.retries(), 2);

        assert_eq!(
            supervisor.handle(LinkEvent::AddressAcquired),
            Action::SignalConnected
        );
        assert_eq!(supervisor.retries(), 0);
        assert_eq!(supervisor.state(), ConnectionState::Connected);
    }

    #[test]
    fn address_acquired_resets_even_after_failure() {
        let mut supervisor = started(0, FailurePolicy::GiveUp);
        supervisor.handle(LinkEvent::Disconnected);
        assert_eq!(supervisor.state(), ConnectionState::Failed);

        assert_eq!(
            supervisor.handle(LinkEvent::AddressAcquired),
            Action::SignalConnected
        );
        assert_eq!(supervisor.retries(), 0);
        assert_eq!(supervisor.state(), ConnectionState::Connected);
    }

    #[test]
    fn reconnect_after_drop_gets_full_budget() {
        let mut supervisor = started(2, FailurePolicy::GiveUp);
        supervisor.handle(LinkEvent::Disconnected);
        supervisor.handle(LinkEvent::AddressAcquired);

        assert_eq!(
            supervisor.handle(LinkEvent::Disconnected),
            Action::Connect { attempt: 1 }
        );
        assert_eq!(
            supervisor.handle(LinkEvent::Disconnected),
            Action::Connect { attempt: 2 }
        );
        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::GiveUp);
    }

    #[test]
    fn restart_while_connecting_restarts_the_count() {
        let mut supervisor = started(3, FailurePolicy::GiveUp);
        supervisor.handle(LinkEvent::Disconnected);
        supervisor.handle(LinkEvent::Disconnected);
        assert_eq!(supervisor.retries(), 2);

        assert_eq!(
            supervisor.handle(LinkEvent::Started),
            Action::Connect { attempt: 0 }
        );
        assert_eq!(supervisor.retries(), 0);
        assert_eq!(
            supervisor.handle(LinkEvent::Disconnected),
            Action::Connect { attempt: 1 }
        );
    }

    #[test]
    fn requested_access_point_skips_station_attempts() {
        let mut supervisor = ConnectionSupervisor::new(3, FailurePolicy::GiveUp);
        assert_eq!(
            supervisor.handle(LinkEvent::AccessPointRequested),
            Action::FallBackToAccessPoint
        );
        assert_eq!(supervisor.state(), ConnectionState::AccessPoint);
        assert_eq!(supervisor.retries(), 0);

        assert_eq!(supervisor.handle(LinkEvent::Started), Action::None);
        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::None);
        assert_eq!(
            supervisor.handle(LinkEvent::AccessPointRequested),
            Action::None
        );
    }

    #[test]
    fn access_point_request_after_failure_is_ignored() {
        let mut supervisor = started(0, FailurePolicy::GiveUp);
        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::GiveUp);
        assert_eq!(
            supervisor.handle(LinkEvent::AccessPointRequested),
            Action::None
        );
    }

    #[test]
    fn drop_before_start_is_ignored() {
        let mut supervisor = ConnectionSupervisor::new(3, FailurePolicy::GiveUp);
        assert_eq!(supervisor.handle(LinkEvent::Disconnected), Action::None);
        assert_eq!(supervisor.state(), ConnectionState::Idle);
        assert_eq!(supervisor.retries(), 0);
    }
}
