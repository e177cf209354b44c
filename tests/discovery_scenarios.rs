#[cfg(test)]
mod discovery_scenarios {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    use cdpwalk::config_loader::load_inventory;
    use cdpwalk::discovery::{DiscoveryEngine, DiscoveryOptions, DiscoveryRun};
    use cdpwalk::gateway::{ReplayGateway, SessionError};
    use cdpwalk::inventory::Inventory;
    use cdpwalk::report::{self, DiscoveryReport};
    use cdpwalk::topology::{self, LinkKey};

    const INVENTORY: &str = r#"
discovery:
  management_interfaces: ["FastEthernet0/1"]
devices:
  - name: R1
    host: 10.0.0.1
    username: admin
    password: secret
    secret: enable
"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn load(inventory: &str) -> Inventory {
        let file = write_temp(inventory);
        load_inventory(file.path()).unwrap()
    }

    fn discover(inventory: &Inventory, capture: &str) -> DiscoveryRun {
        let gateway = ReplayGateway::from_yaml_str(capture).unwrap();
        let options = DiscoveryOptions {
            neighbor_command: inventory.discovery.neighbor_command.clone(),
            default_credentials: inventory.default_credentials(),
        };
        DiscoveryEngine::new(gateway, options)
            .run(inventory.seeds())
            .unwrap()
    }

    /// R1 sees S1; S1 never answers.
    #[test]
    fn test_seed_with_unreachable_neighbor() {
        let capture = r#"
devices:
  "10.0.0.1":
    prompt: "R1#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: S1
        Entry address(es):
          IP address: 10.0.0.2
        Platform: cisco WS-C2960,  Capabilities: Switch
        Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet0/2
        Holdtime : 150 sec
  "10.0.0.2":
    fail: timeout
"#;
        let inventory = load(INVENTORY);
        let run = discover(&inventory, capture);

        assert_eq!(run.visited, 2);
        assert_eq!(run.records.len(), 1);

        let record = &run.records[0];
        assert_eq!(record.source_hostname, "R1");
        assert_eq!(record.source_ip, "10.0.0.1");
        assert_eq!(record.neighbor_ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(record.local_interface, "GigabitEthernet0/1");
        assert_eq!(record.remote_port, "GigabitEthernet0/2");

        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].host, "10.0.0.2");
        assert!(matches!(run.failures[0].error, SessionError::Timeout(_)));
    }

    #[test]
    fn test_mutual_neighbors_reconcile_to_one_link() {
        let capture = r#"
devices:
  "10.0.0.1":
    prompt: "r1.example.com#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: s1.example.com
          IP address: 10.0.0.2
        Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet0/2
  "10.0.0.2":
    prompt: "s1.example.com#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: r1.example.com
          IP address: 10.0.0.1
        Interface: GigabitEthernet0/2,  Port ID (outgoing port): GigabitEthernet0/1
"#;
        let inventory = load(INVENTORY);
        let run = discover(&inventory, capture);

        assert_eq!(run.visited, 2);
        assert_eq!(run.records.len(), 2);
        assert!(run.failures.is_empty());

        let result = topology::reconcile(&run.records, &BTreeSet::new());
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.duplicates, 1);

        let link = &result.links[0];
        let key = LinkKey::between(&link.source_hostname, &link.neighbor_id).unwrap();
        assert_eq!(key.endpoints(), ("r1", "s1"));
    }

    #[test]
    fn test_management_link_removed_after_reconcile() {
        let capture = r#"
devices:
  "10.0.0.1":
    prompt: "R1#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: oob-sw
          IP address: 192.168.0.10
        Interface: FastEthernet0/1,  Port ID (outgoing port): GigabitEthernet0/24
        -------------------------
        Device ID: S1
          IP address: 10.0.0.2
        Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet0/2
"#;
        let inventory = load(INVENTORY);
        let run = discover(&inventory, capture);
        assert_eq!(run.records.len(), 2);
        assert!(run.records.iter().any(|r| r.local_interface == "FastEthernet0/1"));

        let management = inventory.management_interfaces(&Vec::new());
        let result = topology::reconcile(&run.records, &management);
        assert_eq!(result.management_filtered, 1);
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].neighbor_id, "S1");
    }

    #[test]
    fn test_block_without_interfaces_is_not_queued() {
        let capture = r#"
devices:
  "10.0.0.1":
    prompt: "R1#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: X
          IP address: 10.0.0.9
        Holdtime : 150 sec
"#;
        let inventory = load(INVENTORY);
        let run = discover(&inventory, capture);

        assert!(run.records.is_empty());
        assert_eq!(run.visited, 1);
        assert!(run.failures.is_empty());
    }

    #[test]
    fn test_wrong_credentials_do_not_stop_the_run() {
        let inventory = load(
            r#"
devices:
  - host: 10.0.0.1
    username: admin
    password: wrong
  - host: 10.0.0.3
    username: admin
    password: secret
"#,
        );
        let capture = r#"
devices:
  "10.0.0.1":
    password: secret
    prompt: "R1#"
  "10.0.0.3":
    password: secret
    prompt: "R3#"
    commands:
      show cdp neighbors detail: ""
"#;
        let run = discover(&inventory, capture);

        assert_eq!(run.visited, 2);
        assert_eq!(run.failures.len(), 1);
        assert!(matches!(run.failures[0].error, SessionError::Auth(_)));
        assert!(run.records.is_empty());
    }

    #[test]
    fn test_padded_seed_host_not_visited_twice() {
        let inventory = load(
            r#"
devices:
  - name: R1
    host: " 10.0.0.1"
    username: admin
    password: secret
"#,
        );
        let capture = r#"
devices:
  "10.0.0.1":
    prompt: "R1#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: S1
          IP address: 10.0.0.2
        Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet0/2
  "10.0.0.2":
    prompt: "S1#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: R1
          IP address: 10.0.0.1
        Interface: GigabitEthernet0/2,  Port ID (outgoing port): GigabitEthernet0/1
"#;
        let run = discover(&inventory, capture);

        assert_eq!(run.visited, 2);
        assert_eq!(run.records.len(), 2);
        assert!(run.failures.is_empty());
        assert_eq!(run.records[0].source_ip, "10.0.0.1");
    }

    #[test]
    fn test_reports_written_for_discovered_links() {
        let capture = r#"
devices:
  "10.0.0.1":
    prompt: "R1#"
    commands:
      show cdp neighbors detail: |
        -------------------------
        Device ID: S1
          IP address: 10.0.0.2
        Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet0/2
  "10.0.0.2":
    prompt: "S1#"
    commands:
      show cdp neighbors detail: ""
"#;
        let inventory_file = write_temp(INVENTORY);
        let inventory = load_inventory(inventory_file.path()).unwrap();
        let run = discover(&inventory, capture);
        let management = inventory.management_interfaces(&Vec::new());
        let result = topology::reconcile(&run.records, &management);
        let report = DiscoveryReport::new(inventory_file.path(), 1, &run, &result);

        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("discovery_data.json");
        let text_path = dir.path().join("discovery_report.txt");
        report::generate_json_report(&report, &json_path).unwrap();
        report::generate_text_report(&report, &text_path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["metadata"]["unique_links"], 1);
        assert_eq!(json["links"][0]["neighbor_id"], "S1");

        let text = fs::read_to_string(&text_path).unwrap();
        assert!(text.contains("Root device"));
        assert!(text.contains("Connected neighbor"));
    }
}
