mod test_candidate_relay;
mod test_ice_restart_on_failure;
mod test_simultaneous_offers_converge;
