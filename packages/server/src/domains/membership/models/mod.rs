pub mod join_request;
pub mod member;

pub use join_request::{JoinRequest, JoinRequestStatus, JoinRequestWithProfile};
pub use member::{
    EventMember, MemberProfile, MemberRemoval, MemberRole, MemberStatus, NewMember, PaymentStatus,
};
