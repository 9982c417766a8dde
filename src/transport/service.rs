use crate::errors::{PackError, TransportError};
use crate::pack::Record;
use crate::query::{ERROR_FIELD, QUERY_FIELD, QueryBuilder, QueryExecutor, QueryKind, QueryOutcome};
use crate::transport::{SEQUENCE_FIELD, Transport};

/// The peer side of a channel: one request record in, one reply out.
///
/// Failures are reported inside the reply, in `!E`.
pub trait RecordService {
    fn handle(&self, request: Record) -> Record;
}

/// Decode a request, hand it to `service`, encode the reply.
pub fn serve_bytes<S: RecordService + ?Sized>(
    service: &S,
    request: &[u8],
) -> Result<Vec<u8>, PackError> {
    let request = Record::decode(request)?;
    tracing::debug!(fields = request.len(), "serving request");
    service.handle(request).encode()
}

/// Runs query requests: the builder turns the request into SQL, the
/// executor runs it.
///
/// Row results come back as a multi-record whose only control field is
/// the echoed `#`. Status results are added to the request, which is
/// returned as the reply.
#[derive(Debug, Clone)]
pub struct QueryService<B, E> {
    builder: B,
    executor: E,
}

impl<B: QueryBuilder, E: QueryExecutor> QueryService<B, E> {
    pub fn new(builder: B, executor: E) -> Self {
        Self { builder, executor }
    }

    fn run(&self, request: &mut Record) -> Result<Record, String> {
        let kind = QueryKind::of_request(request);
        let params = self.builder.build(request)?;
        let sql = request
            .text(QUERY_FIELD)
            .ok_or_else(|| "No Query!".to_string())?
            .to_string();
        tracing::debug!(sql = %sql, params = params.len(), "executing query");

        match self.executor.execute(kind, &sql, &params)? {
            QueryOutcome::Rows(rows) => {
                let mut reply = Record::new(request.type_tag(), request.details());
                if let Some(sequence) = request.field(SEQUENCE_FIELD) {
                    reply.add_field(sequence.clone());
                }
                tracing::debug!(rows = rows.len(), "packing rows");
                reply.pack(rows);
                Ok(reply)
            }
            QueryOutcome::Status(status) => {
                let mut reply = request.clone();
                for field in status.fields() {
                    reply.add_field(field.clone());
                }
                Ok(reply)
            }
        }
    }
}

impl<B: QueryBuilder, E: QueryExecutor> RecordService for QueryService<B, E> {
    fn handle(&self, mut request: Record) -> Record {
        match self.run(&mut request) {
            Ok(reply) => reply,
            Err(message) => {
                tracing::warn!(error = %message, "query failed");
                request.add(ERROR_FIELD, message);
                request
            }
        }
    }
}

/// An in-process transport that hands every request straight to a service.
#[derive(Debug, Clone)]
pub struct Loopback<S> {
    service: S,
}

impl<S: RecordService> Loopback<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S: RecordService> Transport for Loopback<S> {
    fn send_bytes(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        Ok(serve_bytes(&self.service, request)?)
    }
}
