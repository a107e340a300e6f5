//! Unit tests for database type utilities

#[cfg(test)]
mod tests {
    use crate::db::error::DbError;
    use crate::db::types::{CreateFileRequest, CreateTagRequest, parse_id_list};

    #[test]
    fn test_parse_id_list_none() {
        assert!(parse_id_list(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_id_list_empty_string() {
        assert!(parse_id_list(Some("")).unwrap().is_empty());
        assert!(parse_id_list(Some("   ")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_id_list_single() {
        assert_eq!(parse_id_list(Some("7")).unwrap(), vec![7]);
    }

    #[test]
    fn test_parse_id_list_sorted_and_deduplicated() {
        assert_eq!(parse_id_list(Some("5,2,9,2")).unwrap(), vec![2, 5, 9]);
    }

    #[test]
    fn test_parse_id_list_tolerates_spaces() {
        assert_eq!(parse_id_list(Some(" 1 , 3")).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_parse_id_list_rejects_garbage() {
        let err = parse_id_list(Some("1,x,3")).unwrap_err();
        assert!(matches!(err, DbError::AggregateDecode(ref raw) if raw == "1,x,3"));
    }

    #[test]
    fn test_create_file_request_new() {
        let request = CreateFileRequest::new("/music/song.mp3");
        assert_eq!(request.path, "/music/song.mp3");
        assert!(request.mime.is_none());
        assert!(request.tags.is_empty());
        assert!(request.folder_id.is_none());
    }

    #[test]
    fn test_create_tag_request_new() {
        let request = CreateTagRequest::new("holiday");
        assert_eq!(request.name, "holiday");
        assert!(request.description.is_none());
    }
}
