use crate::entity::Review;
use crate::modify::Repository;

/// Reviews live only in the authoritative store; the cached book carries
/// their aggregate.
pub trait DependOnReviewRepository: 'static + Sync + Send {
    type ReviewRepository: Repository<Review>;
    fn review_repository(&self) -> &Self::ReviewRepository;
}
