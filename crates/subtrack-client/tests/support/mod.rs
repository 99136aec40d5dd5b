pub mod detection_testkit;
