#[cfg(test)]
mod meeting_url_tests {
    use bedrud_agents::api::MeetingUrl;

    #[test]
    fn test_parse_basic_meeting_url() {
        let url = MeetingUrl::parse("https://meet.example.com/m/abc123").unwrap();
        assert_eq!(url.base, "https://meet.example.com");
        assert_eq!(url.scheme, "https");
        assert_eq!(url.room_name, "abc123");
    }

    #[test]
    fn test_parse_keeps_port() {
        let url = MeetingUrl::parse("http://10.0.0.5:8090/m/standup").unwrap();
        assert_eq!(url.base, "http://10.0.0.5:8090");
        assert_eq!(url.scheme, "http");
        assert_eq!(url.room_name, "standup");
    }

    #[test]
    fn test_parse_trailing_slash() {
        let url = MeetingUrl::parse("https://meet.example.com/m/abc123/").unwrap();
        assert_eq!(url.room_name, "abc123");
    }

    #[test]
    fn test_parse_deep_path_takes_last_segment() {
        let url = MeetingUrl::parse("https://meet.example.com/x/y/room9").unwrap();
        assert_eq!(url.room_name, "room9");
    }

    #[test]
    fn test_parse_rejects_missing_room() {
        assert!(MeetingUrl::parse("https://meet.example.com").is_err());
        assert!(MeetingUrl::parse("https://meet.example.com/").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(MeetingUrl::parse("not a url").is_err());
    }
}

#[cfg(test)]
mod response_tests {
    use bedrud_agents::api::{GuestSession, RoomGrant};

    #[test]
    fn test_guest_session_deserializes() {
        let json = r#"{"tokens":{"accessToken":"tok-123","refreshToken":"r"},"user":{"id":"u1","name":"Music Bot"}}"#;
        let session: GuestSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.tokens.access_token, "tok-123");
    }

    #[test]
    fn test_room_grant_deserializes() {
        let json = r#"{"token":"lk-token","livekitHost":"https://lk.example.com","mode":"normal"}"#;
        let grant: RoomGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.token, "lk-token");
        assert_eq!(grant.livekit_host.as_deref(), Some("https://lk.example.com"));
    }

    #[test]
    fn test_room_grant_without_host() {
        let json = r#"{"token":"lk-token"}"#;
        let grant: RoomGrant = serde_json::from_str(json).unwrap();
        assert!(grant.livekit_host.is_none());
        assert!(grant.websocket_url("https").is_err());
    }

    fn grant(host: &str) -> RoomGrant {
        RoomGrant {
            token: "t".to_string(),
            livekit_host: Some(host.to_string()),
        }
    }

    #[test]
    fn test_websocket_url_rewrites_http_schemes() {
        assert_eq!(
            grant("http://lk.example.com").websocket_url("https").unwrap(),
            "ws://lk.example.com"
        );
        assert_eq!(
            grant("https://lk.example.com").websocket_url("http").unwrap(),
            "wss://lk.example.com"
        );
    }

    #[test]
    fn test_websocket_url_passes_ws_through() {
        assert_eq!(
            grant("wss://lk.example.com").websocket_url("http").unwrap(),
            "wss://lk.example.com"
        );
        assert_eq!(
            grant("ws://lk.example.com").websocket_url("https").unwrap(),
            "ws://lk.example.com"
        );
    }

    #[test]
    fn test_websocket_url_bare_host_follows_meeting_scheme() {
        assert_eq!(
            grant("lk.example.com:7880").websocket_url("https").unwrap(),
            "wss://lk.example.com:7880"
        );
        assert_eq!(
            grant("lk.example.com:7880").websocket_url("http").unwrap(),
            "ws://lk.example.com:7880"
        );
    }

    #[test]
    fn test_websocket_url_empty_host_is_error() {
        assert!(grant("").websocket_url("https").is_err());
    }
}
