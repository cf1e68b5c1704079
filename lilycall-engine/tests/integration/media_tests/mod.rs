mod test_screen_share_round_trip;
mod test_screen_track_end_auto_reverts;
