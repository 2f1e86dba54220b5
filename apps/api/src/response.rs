use serde::Serialize;

/// Response envelope for single-entity endpoints: `{ "success": true, "data": … }`.
/// Matches the contract the existing dashboard client was written against.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Envelope for list endpoints, with the item count alongside the data.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_counts_items() {
        let resp = ListResponse::new(vec![1, 2, 3]);
        assert!(resp.success);
        assert_eq!(resp.count, 3);
    }

    #[test]
    fn test_api_response_serializes_envelope() {
        let resp = ApiResponse::new("ok");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "ok");
    }
}
